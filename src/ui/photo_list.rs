use iced::widget::{button, image, row, scrollable, text, Column};
use iced::{Element, Length};

use photo_renamer::{PhotoId, ThumbnailEntry};

use crate::Message;

/// Width of the preview next to each filename
const PREVIEW_WIDTH: f32 = 96.0;

/// Scrollable list of tracked photos with their thumbnails
pub fn view<'a>(entries: Vec<ThumbnailEntry>, selected: Option<PhotoId>) -> Element<'a, Message> {
    if entries.is_empty() {
        return text("No photos found in this folder.").into();
    }

    let list = entries
        .into_iter()
        .fold(Column::new().spacing(6), |list, entry| {
            list.push(photo_row(entry, selected))
        });

    scrollable(list)
        .width(Length::FillPortion(2))
        .height(Length::Fill)
        .into()
}

fn photo_row<'a>(entry: ThumbnailEntry, selected: Option<PhotoId>) -> Element<'a, Message> {
    let preview: Element<'a, Message> = match entry.thumbnail {
        Some(path) => image(image::Handle::from_path(path))
            .width(Length::Fixed(PREVIEW_WIDTH))
            .into(),
        None => text("…")
            .width(Length::Fixed(PREVIEW_WIDTH))
            .into(),
    };

    let style = if selected == Some(entry.id) {
        button::primary
    } else {
        button::secondary
    };

    button(row![preview, text(entry.name)].spacing(10))
        .on_press(Message::SelectPhoto(entry.id))
        .style(style)
        .width(Length::Fill)
        .into()
}
