use iced::widget::{column, scrollable, text, Column};
use iced::{Element, Length};

use photo_renamer::Result;

use crate::Message;

/// Every rename the application has performed, oldest first
pub fn view<'a>(entries: Result<Vec<String>>) -> Element<'a, Message> {
    let entries = match entries {
        Ok(entries) => entries,
        Err(err) => return text(format!("Cannot read the naming log: {err}")).into(),
    };

    if entries.is_empty() {
        return text("Nothing has been renamed yet.").into();
    }

    let lines = entries
        .into_iter()
        .fold(Column::new().spacing(2), |lines, line| lines.push(text(line).size(12)));

    column![text("Naming log").size(20), scrollable(lines).height(Length::Fill)]
        .spacing(10)
        .into()
}
