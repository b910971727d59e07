use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use iced::widget::{canvas, column, container, image, pick_list, row, stack, text, Space};
use iced::{Alignment, ContentFit, Element, Length, Size, Subscription, Task, Theme};

use facecam_core::capture::infrastructure::ffmpeg_camera::FfmpegCamera;
use facecam_core::capture::live_feed::FrameSource;
use facecam_core::detection::infrastructure::onnx_model_loader::{
    progress_message, OnnxModelLoader,
};
use facecam_core::render::display_list::DisplayList;
use facecam_core::render::domain::overlay_surface::OverlaySurface;
use facecam_core::render::layout::{canvas_size, CanvasSize};
use facecam_core::session::events::{self, SessionEvent};
use facecam_core::session::session::{Session, SessionConfig, SessionError, Transition};
use facecam_core::shared::frame::Frame;

use crate::settings::{Appearance, Settings};
use crate::theme;
use crate::widgets::loading_overlay::loading_overlay;
use crate::widgets::overlay_canvas::OverlayCanvas;
use crate::widgets::toggle_button::toggle_button;
use crate::widgets::video_view;
use crate::workers::toggle_worker::{spawn_toggle, ToggleResult};

pub const WINDOW_SIZE: Size = Size::new(1100.0, 780.0);
const PAGE_PADDING: f32 = 20.0;
const POLL_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone)]
pub enum Message {
    Toggle,
    ToggleHovered(bool),
    Poll,
    WindowResized(Size),
    AppearanceChanged(Appearance),
    AlertDismissed,
}

pub struct App {
    settings: Settings,
    session: Arc<Mutex<Session>>,
    events: events::Subscription,
    video: FrameSource,
    overlay: Arc<Mutex<DisplayList>>,
    canvas: CanvasSize,

    loading: bool,
    running: bool,
    load_error: Option<String>,
    toggle_error: Option<String>,
    download: Option<String>,
    download_rx: Receiver<String>,
    pending_toggle: Option<Receiver<ToggleResult>>,
    toggle_hovered: bool,

    shown_frame: Option<Arc<Frame>>,
    frame_handle: Option<image::Handle>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let canvas = layout_for(WINDOW_SIZE.width);
        let overlay = Arc::new(Mutex::new(DisplayList::new(canvas.width, canvas.height)));

        let (download_tx, download_rx) = crossbeam_channel::unbounded();
        let loader = OnnxModelLoader::new(settings.model_config()).with_progress(Arc::new(
            move |name: &str, downloaded: u64, total: u64| {
                let _ = download_tx.send(progress_message(name, downloaded, total));
            },
        ));
        let session = Session::new(
            Box::new(FfmpegCamera::new(settings.camera_device())),
            Box::new(loader),
            overlay.clone(),
            SessionConfig::default(),
        );
        let events = session.subscribe();
        let video = session.video();

        (
            Self {
                settings,
                session: Arc::new(Mutex::new(session)),
                events,
                video,
                overlay,
                canvas,
                loading: false,
                running: false,
                load_error: None,
                toggle_error: None,
                download: None,
                download_rx,
                pending_toggle: None,
                toggle_hovered: false,
                shown_frame: None,
                frame_handle: None,
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Toggle => {
                if self.pending_toggle.is_none() {
                    self.load_error = None;
                    self.toggle_error = None;
                    self.pending_toggle = Some(spawn_toggle(self.session.clone()));
                }
            }
            Message::ToggleHovered(hovered) => {
                self.toggle_hovered = hovered;
            }
            Message::Poll => return self.poll(),
            Message::WindowResized(size) => {
                let canvas = layout_for(size.width);
                if canvas != self.canvas {
                    self.canvas = canvas;
                    // The session may be busy loading; the surface has its own lock.
                    self.overlay
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .resize(canvas.width, canvas.height);
                }
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::AlertDismissed => {}
        }
        Task::none()
    }

    fn poll(&mut self) -> Task<Message> {
        let mut alert = None;
        for event in self.events.drain() {
            match event {
                SessionEvent::LoadingChanged(loading) => self.loading = loading,
                SessionEvent::RunningChanged(running) => self.running = running,
                SessionEvent::CameraUnavailable(message) => alert = Some(message),
            }
        }

        while let Ok(progress) = self.download_rx.try_recv() {
            self.download = Some(progress);
        }

        if let Some(rx) = &self.pending_toggle {
            match rx.try_recv() {
                Ok(result) => {
                    self.pending_toggle = None;
                    self.finish_toggle(result);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => self.pending_toggle = None,
            }
        }

        self.refresh_video();

        match alert {
            Some(message) => Task::perform(show_camera_alert(message), |_| {
                Message::AlertDismissed
            }),
            None => Task::none(),
        }
    }

    fn finish_toggle(&mut self, result: ToggleResult) {
        match result {
            Ok(Transition::Started) => log::info!("Camera started"),
            Ok(Transition::Stopped) => log::info!("Camera stopped"),
            Ok(Transition::CameraUnavailable) => {}
            Err(e) => match failure_notice(&e) {
                FailureNotice::LoadingOverlay(message) => {
                    // The loading layer stays up until a retry succeeds.
                    self.load_error = Some(message);
                    self.loading = true;
                }
                FailureNotice::Inline(message) => self.toggle_error = Some(message),
            },
        }
        self.download = None;
    }

    fn refresh_video(&mut self) {
        if !self.running {
            self.shown_frame = None;
            self.frame_handle = None;
            return;
        }
        let Some(frame) = self.video.latest() else {
            return;
        };
        if self
            .shown_frame
            .as_ref()
            .is_some_and(|shown| Arc::ptr_eq(shown, &frame))
        {
            return;
        }
        self.frame_handle = Some(video_view::frame_handle(&frame));
        self.shown_frame = Some(frame);
    }

    pub fn view(&self) -> Element<'_, Message> {
        let header = row![
            text("FaceCam").size(26),
            Space::new().width(Length::Fill),
            pick_list(
                Appearance::ALL,
                Some(self.settings.appearance),
                Message::AppearanceChanged
            )
            .text_size(13),
        ]
        .align_y(Alignment::Center);

        let width = self.canvas.width as f32;
        let height = self.canvas.height as f32;

        let video: Element<'_, Message> = match &self.frame_handle {
            Some(handle) => image(handle.clone())
                .width(width)
                .height(height)
                .content_fit(ContentFit::Fill)
                .into(),
            None => container(text("Camera is off").size(14))
                .width(width)
                .height(height)
                .center_x(width)
                .center_y(height)
                .style(|theme: &Theme| container::Style {
                    background: Some(theme.extended_palette().background.strong.color.into()),
                    ..container::Style::default()
                })
                .into(),
        };

        let mut stage = stack![
            video,
            canvas(OverlayCanvas::new(self.overlay.clone()))
                .width(width)
                .height(height),
        ]
        .width(width)
        .height(height);
        if self.loading {
            stage = stage.push(loading_overlay(
                self.download.as_deref(),
                self.load_error.as_deref(),
            ));
        }

        let on_press = self.pending_toggle.is_none().then_some(Message::Toggle);
        let controls = toggle_button(
            self.running,
            on_press,
            self.toggle_hovered,
            Message::ToggleHovered,
        );

        let mut page = column![
            header,
            container(stage).width(Length::Fill).center_x(Length::Fill),
            container(controls).width(Length::Fill).center_x(Length::Fill),
        ]
        .spacing(16)
        .padding(PAGE_PADDING);
        if let Some(error) = &self.toggle_error {
            page = page.push(
                container(text(error.as_str()).size(13).style(|theme: &Theme| {
                    text::Style {
                        color: Some(theme.extended_palette().danger.strong.color),
                    }
                }))
                    .width(Length::Fill)
                    .center_x(Length::Fill),
            );
        }

        container(page)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            iced::time::every(POLL_INTERVAL).map(|_| Message::Poll),
            iced::window::resize_events().map(|(_id, size)| Message::WindowResized(size)),
        ])
    }
}

/// Canvas size for a window of the given width.
fn layout_for(window_width: f32) -> CanvasSize {
    let viewport = f64::from(window_width);
    let container = (viewport - 2.0 * f64::from(PAGE_PADDING)).max(1.0);
    canvas_size(viewport, container)
}

/// Where a failed toggle is shown.
#[derive(Debug, PartialEq, Eq)]
enum FailureNotice {
    /// Inside the loading layer, which stays up.
    LoadingOverlay(String),
    /// Below the toggle button; the stage stays as it was.
    Inline(String),
}

fn failure_notice(error: &SessionError) -> FailureNotice {
    match error {
        SessionError::ModelLoad(_) => FailureNotice::LoadingOverlay(error.to_string()),
        SessionError::Spawn(_) => FailureNotice::Inline(error.to_string()),
    }
}

async fn show_camera_alert(message: String) {
    rfd::AsyncMessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title("Camera unavailable")
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show()
        .await;
}
