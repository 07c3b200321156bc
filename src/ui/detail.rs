use iced::widget::{button, column, row, scrollable, text, text_input, Column};
use iced::{Element, Length};

use photo_renamer::{Photo, Tag};

use crate::Message;

/// Right-hand panel: the selected photo's tags and history, plus every tag
pub fn view<'a>(
    photo: Option<Photo>,
    tags: Vec<Tag>,
    most_used: Option<Tag>,
    tag_input: &'a str,
) -> Element<'a, Message> {
    let mut panel = Column::new().spacing(16);

    match &photo {
        Some(photo) => {
            panel = panel
                .push(text(photo.current_name.clone()).size(20))
                .push(text(photo.path.display().to_string()).size(12))
                .push(current_tags(photo))
                .push(
                    row![
                        text_input("New or existing tag", tag_input)
                            .on_input(Message::TagInputChanged)
                            .on_submit(Message::AddTag)
                            .padding(8),
                        button("Add tag").on_press(Message::AddTag).padding(8),
                    ]
                    .spacing(10),
                )
                .push(previous_names(photo));
        }
        None => {
            panel = panel.push(text("Select a photo to edit its tags."));
        }
    }

    if let Some(tag) = most_used.filter(|t| !t.members.is_empty()) {
        panel = panel.push(
            text(format!("Most used tag: {} ({} photos)", tag.name, tag.members.len())).size(12),
        );
    }
    panel = panel.push(all_tags(tags, photo.as_ref()));

    scrollable(panel)
        .width(Length::FillPortion(3))
        .height(Length::Fill)
        .into()
}

fn current_tags<'a>(photo: &Photo) -> Element<'a, Message> {
    if photo.tags.is_empty() {
        return text("No tags yet.").into();
    }

    photo
        .tags
        .iter()
        .fold(row![text("Tags:")].spacing(10), |chips, tag| {
            chips.push(
                button(text(format!("{tag}  ✕")))
                    .on_press(Message::RemoveTag(tag.clone()))
                    .style(button::secondary),
            )
        })
        .into()
}

fn previous_names<'a>(photo: &Photo) -> Element<'a, Message> {
    // Most recent first
    let names = photo.name_history.iter().rev().fold(
        column![text("Previous names").size(16)].spacing(6),
        |names, name| {
            names.push(
                row![
                    button("Revert")
                        .on_press(Message::RevertTo(name.clone()))
                        .style(button::secondary),
                    text(name.clone()),
                ]
                .spacing(10),
            )
        },
    );

    if photo.name_history.is_empty() {
        names.push(text("This photo has never been renamed.").size(12)).into()
    } else {
        names.into()
    }
}

fn all_tags<'a>(tags: Vec<Tag>, photo: Option<&Photo>) -> Element<'a, Message> {
    let header = column![text("All tags").size(16)].spacing(6);
    if tags.is_empty() {
        return header.push(text("No tags yet.").size(12)).into();
    }

    tags.into_iter()
        .fold(header, |list, tag| {
            let can_add = photo.is_some_and(|p| !p.has_tag(&tag.name));
            list.push(
                row![
                    text(format!("{} ({})", tag.name, tag.members.len())),
                    button("Add")
                        .on_press_maybe(can_add.then(|| Message::AddExistingTag(tag.name.clone()))),
                    button("Delete")
                        .on_press(Message::DeleteTag(tag.name.clone()))
                        .style(button::danger),
                ]
                .spacing(10),
            )
        })
        .into()
}
