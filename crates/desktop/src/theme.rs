use iced::color;
use iced::theme::Palette;
use iced::Theme;

use crate::settings::Appearance;

pub fn resolve_theme(appearance: Appearance) -> Theme {
    let dark = match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => system_prefers_dark(),
    };

    if dark {
        Theme::custom("FaceCam Dark", dark_palette())
    } else {
        Theme::custom("FaceCam Light", light_palette())
    }
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x18, 0x1a, 0x1f),
        text: color!(0xe6, 0xe6, 0xe6),
        primary: color!(0x00, 0x7b, 0xff),
        success: color!(0x28, 0xa7, 0x45),
        warning: color!(0xff, 0xc1, 0x07),
        danger: color!(0xdc, 0x35, 0x45),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xf4, 0xf5, 0xf7),
        text: color!(0x21, 0x25, 0x29),
        primary: color!(0x00, 0x7b, 0xff),
        success: color!(0x28, 0xa7, 0x45),
        warning: color!(0xe0, 0xa8, 0x00),
        danger: color!(0xdc, 0x35, 0x45),
    }
}

fn system_prefers_dark() -> bool {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|o| String::from_utf8_lossy(&o.stdout).trim().eq_ignore_ascii_case("dark"))
            .unwrap_or(true)
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("gsettings")
            .args(["get", "org.gnome.desktop.interface", "color-scheme"])
            .output()
            .map(|o| !String::from_utf8_lossy(&o.stdout).contains("light"))
            .unwrap_or(true)
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        true
    }
}
