use std::time::Duration;

use iced::border::Border;
use iced::widget::{button, container, mouse_area, text};
use iced::{color, Color, Element, Padding, Shadow, Theme, Vector};
use iced_anim::transition::Easing;
use iced_anim::AnimationBuilder;

const DISABLED_ALPHA: f32 = 0.5;
const HOVER_DARKEN: f32 = 0.06;
const FLOAT_HEIGHT: f32 = 1.0;
const CORNER_RADIUS: f32 = 6.0;
const SHADOW_BLUR_BASE: f32 = 8.0;
const SHADOW_BLUR_HOVER: f32 = 14.0;
const SHADOW_ALPHA_BASE: f32 = 0.2;
const SHADOW_ALPHA_HOVER: f32 = 0.35;
const ANIMATION_DURATION: Duration = Duration::from_millis(200);

pub fn label(running: bool) -> &'static str {
    if running {
        "Stop Camera"
    } else {
        "Start Camera"
    }
}

fn base_color(running: bool) -> Color {
    if running {
        color!(0xdc, 0x35, 0x45)
    } else {
        color!(0x00, 0x7b, 0xff)
    }
}

/// Start/stop button: blue while idle, red while the camera runs.
///
/// `on_press` is `None` while a toggle is already in flight, which renders
/// the button faded and ignores clicks.
pub fn toggle_button<'a, Message: Clone + 'a>(
    running: bool,
    on_press: Option<Message>,
    hovered: bool,
    on_hover: impl Fn(bool) -> Message + 'a,
) -> Element<'a, Message> {
    let target = if hovered && on_press.is_some() {
        1.0_f32
    } else {
        0.0
    };

    let animated: Element<'a, Message> = AnimationBuilder::new(target, move |t: f32| {
        build_button(running, on_press.clone(), t.clamp(0.0, 1.0))
    })
    .animates_layout(true)
    .animation(Easing::EASE_OUT.with_duration(ANIMATION_DURATION))
    .into();

    mouse_area(animated)
        .on_enter(on_hover(true))
        .on_exit(on_hover(false))
        .into()
}

fn build_button<'a, Message: Clone + 'a>(
    running: bool,
    on_press: Option<Message>,
    hover_amount: f32,
) -> Element<'a, Message> {
    let base = base_color(running);
    let btn = button(text(label(running)).size(16))
        .on_press_maybe(on_press)
        .padding([10, 24])
        .style(move |_theme: &Theme, status: button::Status| match status {
            button::Status::Disabled => faded(base),
            button::Status::Pressed => styled(base, 1.0),
            _ => styled(base, hover_amount),
        });

    let rise = hover_amount * FLOAT_HEIGHT;
    container(btn)
        .padding(Padding {
            top: FLOAT_HEIGHT - rise,
            bottom: rise,
            ..Padding::ZERO
        })
        .into()
}

fn styled(base: Color, hover_amount: f32) -> button::Style {
    let t = hover_amount;
    button::Style {
        background: Some(darken(base, t).into()),
        text_color: Color::WHITE,
        border: Border {
            radius: CORNER_RADIUS.into(),
            ..Border::default()
        },
        shadow: Shadow {
            color: Color { a: lerp(SHADOW_ALPHA_BASE, SHADOW_ALPHA_HOVER, t), ..base },
            offset: Vector::new(0.0, 3.0),
            blur_radius: lerp(SHADOW_BLUR_BASE, SHADOW_BLUR_HOVER, t),
        },
        ..button::Style::default()
    }
}

fn faded(base: Color) -> button::Style {
    button::Style {
        background: Some(Color { a: DISABLED_ALPHA, ..base }.into()),
        text_color: Color { a: 0.8, ..Color::WHITE },
        border: Border {
            radius: CORNER_RADIUS.into(),
            ..Border::default()
        },
        ..button::Style::default()
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn darken(color: Color, amount: f32) -> Color {
    let shift = HOVER_DARKEN * amount;
    Color {
        r: (color.r - shift).max(0.0),
        g: (color.g - shift).max(0.0),
        b: (color.b - shift).max(0.0),
        a: 1.0,
    }
}
