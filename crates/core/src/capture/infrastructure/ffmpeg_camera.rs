use std::path::Path;
use std::time::{Duration, Instant};

use crate::capture::domain::camera::{
    Camera, CameraError, CameraRequest, CameraStream, FacingMode,
};
use crate::shared::frame::Frame;

/// Where to capture from: an ffmpeg input device plus its URL, or a plain
/// media URL/file when `input_format` is `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraDevice {
    pub input_format: Option<String>,
    pub url: String,
}

impl CameraDevice {
    /// The first camera of the platform's native capture API.
    pub fn platform_default() -> Self {
        #[cfg(target_os = "linux")]
        let (format, url) = ("v4l2", "/dev/video0");
        #[cfg(target_os = "macos")]
        let (format, url) = ("avfoundation", "0");
        #[cfg(target_os = "windows")]
        let (format, url) = ("dshow", "video=Integrated Camera");
        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        let (format, url) = ("v4l2", "/dev/video0");

        Self {
            input_format: Some(format.to_string()),
            url: url.to_string(),
        }
    }

    /// A video file played back as if it were a camera.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            input_format: None,
            url: path.as_ref().to_string_lossy().into_owned(),
        }
    }

    /// Live devices produce frames at their own pace; files are throttled
    /// to their nominal frame rate.
    pub fn is_live(&self) -> bool {
        self.input_format.is_some()
    }
}

impl Default for CameraDevice {
    fn default() -> Self {
        Self::platform_default()
    }
}

/// Opens cameras through libavdevice (v4l2, avfoundation, dshow) or any
/// input ffmpeg can demux.
pub struct FfmpegCamera {
    device: CameraDevice,
}

impl FfmpegCamera {
    pub fn new(device: CameraDevice) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &CameraDevice {
        &self.device
    }

    fn open_input(
        &self,
        request: &CameraRequest,
    ) -> Result<ffmpeg_next::format::context::Input, CameraError> {
        let options = capture_options(request, self.device.is_live());
        let url = &self.device.url;

        let Some(name) = &self.device.input_format else {
            return ffmpeg_next::format::input_with_dictionary(url, options)
                .map_err(|e| map_open_error(url, e));
        };

        ffmpeg_next::device::register_all();
        let format = ffmpeg_next::device::input::video()
            .find(|f| f.name() == name.as_str())
            .ok_or_else(|| CameraError::Open(format!("input device {name} is not available")))?;

        match ffmpeg_next::format::open_with(url, &format, options)
            .map_err(|e| map_open_error(url, e))?
        {
            ffmpeg_next::format::context::Context::Input(input) => Ok(input),
            ffmpeg_next::format::context::Context::Output(_) => {
                Err(CameraError::Open(format!("{name} is not an input device")))
            }
        }
    }
}

impl Default for FfmpegCamera {
    fn default() -> Self {
        Self::new(CameraDevice::platform_default())
    }
}

impl Camera for FfmpegCamera {
    fn open(&mut self, request: &CameraRequest) -> Result<Box<dyn CameraStream>, CameraError> {
        if request.audio {
            return Err(CameraError::AudioUnsupported);
        }
        if request.facing_mode == FacingMode::Environment {
            log::warn!("Facing mode is not selectable here, using {}", self.device.url);
        }

        ffmpeg_next::init().map_err(|e| CameraError::Open(e.to_string()))?;
        let input = self.open_input(request)?;
        let stream = FfmpegCameraStream::new(input, self.device.is_live())
            .map_err(|e| CameraError::Open(e.to_string()))?;

        let (width, height) = stream.dimensions();
        log::info!("Opened camera {} at {width}x{height}", self.device.url);
        Ok(Box::new(stream))
    }
}

/// Demuxer options for the requested mode. Only devices understand them.
fn capture_options(request: &CameraRequest, live: bool) -> ffmpeg_next::Dictionary<'static> {
    let mut options = ffmpeg_next::Dictionary::new();
    if !live {
        return options;
    }
    if let (Some(w), Some(h)) = (request.width, request.height) {
        options.set("video_size", &format!("{w}x{h}"));
    }
    if let Some(fps) = request.fps {
        options.set("framerate", &fps.to_string());
    }
    options
}

fn map_open_error(url: &str, err: ffmpeg_next::Error) -> CameraError {
    if let ffmpeg_next::Error::Other { errno } = err {
        match std::io::Error::from_raw_os_error(errno).kind() {
            std::io::ErrorKind::PermissionDenied => return CameraError::PermissionDenied,
            std::io::ErrorKind::NotFound => return CameraError::NoDevice(url.to_string()),
            _ => {}
        }
    }
    CameraError::Open(err.to_string())
}

struct FfmpegCameraStream {
    input: Option<ffmpeg_next::format::context::Input>,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
    frame_index: usize,
    flushing: bool,
    pacer: Option<Pacer>,
}

// Safety: the stream is moved into the live-feed thread and only used
// there. The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegCameraStream {}

impl FfmpegCameraStream {
    fn new(
        input: ffmpeg_next::format::context::Input,
        live: bool,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;
        let stream_index = stream.index();
        let rate = stream.rate();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;
        let width = decoder.width();
        let height = decoder.height();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let pacer = if !live && rate.numerator() > 0 && rate.denominator() > 0 {
            let fps = rate.numerator() as f64 / rate.denominator() as f64;
            Some(Pacer::new(Duration::from_secs_f64(1.0 / fps)))
        } else {
            None
        };

        Ok(Self {
            input: Some(input),
            decoder,
            scaler,
            stream_index,
            width,
            height,
            frame_index: 0,
            flushing: false,
            pacer,
        })
    }

    fn try_receive(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler.run(&decoded, &mut rgb_frame)?;

        let pixels = pack_rgb_rows(&rgb_frame, self.width, self.height);
        let frame = Frame::new(pixels, self.width, self.height, 3, self.frame_index);
        self.frame_index += 1;
        Ok(Some(frame))
    }
}

impl CameraStream for FfmpegCameraStream {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        loop {
            if let Some(frame) = self.try_receive()? {
                if let Some(pacer) = self.pacer.as_mut() {
                    pacer.wait();
                }
                return Ok(Some(frame));
            }
            if self.flushing {
                return Ok(None);
            }

            let input = self.input.as_mut().ok_or("camera stream is stopped")?;
            match input.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != self.stream_index {
                        continue;
                    }
                    if let Err(e) = self.decoder.send_packet(&packet) {
                        log::debug!("Dropped undecodable packet: {e}");
                    }
                }
                None => {
                    let _ = self.decoder.send_eof();
                    self.flushing = true;
                }
            }
        }
    }

    fn stop(&mut self) {
        if self.input.take().is_some() {
            log::debug!("Released camera input");
        }
    }
}

/// Sleeps so that frames are handed out no faster than the source rate.
struct Pacer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Pacer {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    fn wait(&mut self) {
        let now = Instant::now();
        let due = self.next_due.unwrap_or(now);
        if due > now {
            std::thread::sleep(due - now);
        }
        self.next_due = Some(due.max(now) + self.interval);
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer,
/// dropping any row padding (stride > width * 3).
fn pack_rgb_rows(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}
