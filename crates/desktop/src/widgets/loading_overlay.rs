use iced::widget::{column, container, text};
use iced::{Alignment, Color, Element, Length, Theme};

/// Dimmed layer over the video while models load.
///
/// A load failure keeps the layer up and shows the error under the
/// spinner text; the next start retries.
pub fn loading_overlay<'a, Message: 'a>(
    progress: Option<&'a str>,
    error: Option<&'a str>,
) -> Element<'a, Message> {
    let mut content = column![text("Loading models...").size(20)]
        .spacing(8)
        .align_x(Alignment::Center);

    if let Some(progress) = progress {
        content = content.push(text(progress).size(13));
    }
    if let Some(error) = error {
        content = content.push(
            text(error)
                .size(13)
                .style(|theme: &Theme| text::Style {
                    color: Some(theme.extended_palette().danger.strong.color),
                }),
        );
    }

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .style(|_theme: &Theme| container::Style {
            background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.6).into()),
            text_color: Some(Color::WHITE),
            ..container::Style::default()
        })
        .into()
}
