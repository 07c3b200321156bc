use iced::widget::{button, column, container, row, text};
use iced::{window, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use photo_renamer::thumbnail::{self, ThumbnailCache};
use photo_renamer::{AppPaths, Coordinator, Photo, PhotoId, RenamerError, Result};

mod ui;

/// Main application state
struct PhotoRenamer {
    /// Opened when the user picks the first folder
    coordinator: Option<Coordinator>,
    paths: AppPaths,
    thumbnails: ThumbnailCache,
    /// Selected photo, by id so renames don't lose it
    selected: Option<PhotoId>,
    tag_input: String,
    show_log: bool,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked the "Open Folder" button
    OpenFolder,
    SelectPhoto(PhotoId),
    TagInputChanged(String),
    /// Add the typed tag to the selected photo
    AddTag,
    AddExistingTag(String),
    RemoveTag(String),
    DeleteTag(String),
    RevertTo(String),
    ForgetMissing,
    ToggleLog,
    /// Background thumbnail generation finished
    ThumbnailsReady(Vec<(PhotoId, PathBuf)>),
    /// The user asked to close the window
    CloseRequested(window::Id),
}

impl PhotoRenamer {
    fn new() -> (Self, Task<Message>) {
        let paths = AppPaths::from_env();
        let thumbnails = ThumbnailCache::new(&paths.thumbnails);
        tracing::info!(root = %paths.root.display(), "photo renamer starting");

        (
            PhotoRenamer {
                coordinator: None,
                paths,
                thumbnails,
                selected: None,
                tag_input: String::new(),
                show_log: false,
                status: "Open a folder to start tagging photos.".to_string(),
            },
            Task::none(),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFolder => {
                let Some(folder) = FileDialog::new()
                    .set_title("Select Folder with Photos")
                    .pick_folder()
                else {
                    return Task::none();
                };

                if let Some(result) = self.run(|c| c.import_directory(&folder)) {
                    self.status = format!(
                        "Imported {} photos from {}, {} already tracked.",
                        result.imported_count,
                        folder.display(),
                        result.skipped_count
                    );
                    return self.generate_thumbnails();
                }
            }
            Message::SelectPhoto(id) => {
                self.selected = Some(id);
                self.show_log = false;
            }
            Message::TagInputChanged(value) => {
                self.tag_input = value;
            }
            Message::AddTag => {
                let tag = self.tag_input.trim().to_string();
                if let Some(photo) = self.on_selected(|c, path| c.add_tag(&path, &tag)) {
                    self.tag_input.clear();
                    self.status = format!("Tagged {} with {tag}.", photo.current_name);
                }
            }
            Message::AddExistingTag(tag) => {
                if let Some(photo) = self.on_selected(|c, path| c.add_existing_tag(&path, &tag)) {
                    self.status = format!("Tagged {} with {tag}.", photo.current_name);
                }
            }
            Message::RemoveTag(tag) => {
                if let Some(photo) = self.on_selected(|c, path| c.remove_tag(&path, &tag)) {
                    self.status = format!("Removed {tag} from {}.", photo.current_name);
                }
            }
            Message::DeleteTag(tag) => {
                if self.run(|c| c.delete_tag(&tag)).is_some() {
                    self.status = format!("Deleted tag {tag}.");
                }
            }
            Message::RevertTo(name) => {
                if let Some(photo) = self.on_selected(|c, path| c.revert_to_name(&path, &name)) {
                    self.status = format!("Reverted to {}.", photo.current_name);
                }
            }
            Message::ForgetMissing => {
                if let Some(missing) = self.run(|c| c.forget_missing_photos()) {
                    self.status = format!("Forgot {} missing photos.", missing.len());
                }
            }
            Message::ToggleLog => {
                self.show_log = !self.show_log;
            }
            Message::ThumbnailsReady(done) => {
                let count = done.len();
                if self.run(|c| {
                    c.record_thumbnails(done);
                    Ok(())
                })
                .is_some()
                {
                    tracing::info!(count, "thumbnails ready");
                }
            }
            Message::CloseRequested(id) => {
                if let Some(coordinator) = self.coordinator.take() {
                    if let Err(err) = coordinator.close() {
                        tracing::error!("could not save catalog on exit: {err}");
                    }
                }
                return window::close(id);
            }
        }

        Task::none()
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let header = row![
            text("Photo Renamer").size(32),
            button("Open Folder")
                .on_press(Message::OpenFolder)
                .padding(10),
            button("Forget missing")
                .on_press_maybe(self.coordinator.as_ref().map(|_| Message::ForgetMissing))
                .padding(10),
            button(if self.show_log { "Hide log" } else { "Naming log" })
                .on_press(Message::ToggleLog)
                .padding(10),
        ]
        .spacing(20);

        let body: Element<Message> = match &self.coordinator {
            None => text("No folder opened yet.").into(),
            Some(c) if self.show_log => ui::log_view::view(c.naming_log()),
            Some(c) => {
                let selected = self.selected.and_then(|id| c.photo_by_id(id)).cloned();
                row![
                    ui::photo_list::view(c.thumbnail_list(), self.selected),
                    ui::detail::view(selected, c.all_tags(), c.most_tagged_tag().cloned(), &self.tag_input),
                ]
                .spacing(20)
                .into()
            }
        };

        let content = column![header, text(&self.status).size(16), body]
            .spacing(20)
            .padding(20);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        window::close_requests().map(Message::CloseRequested)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    /// The coordinator, opening the catalog on first use
    fn coordinator(&mut self) -> Result<&mut Coordinator> {
        let coordinator = match self.coordinator.take() {
            Some(c) => c,
            None => Coordinator::open(&self.paths)?,
        };
        Ok(self.coordinator.insert(coordinator))
    }

    /// Run one coordinator operation and save whatever state it left behind,
    /// including partial changes from a failed operation
    fn run<T>(&mut self, op: impl FnOnce(&mut Coordinator) -> Result<T>) -> Option<T> {
        let coordinator = match self.coordinator() {
            Ok(c) => c,
            Err(err) => {
                self.report(&err);
                return None;
            }
        };

        let outcome = op(&mut *coordinator);
        let saved = coordinator.flush();

        match (outcome, saved) {
            (Ok(value), Ok(())) => Some(value),
            (Err(err), _) | (Ok(_), Err(err)) => {
                self.report(&err);
                None
            }
        }
    }

    /// Run an operation on the selected photo and keep it selected
    fn on_selected(
        &mut self,
        op: impl FnOnce(&mut Coordinator, PathBuf) -> Result<Photo>,
    ) -> Option<Photo> {
        let Some(path) = self.selected_path() else {
            self.status = "Select a photo first.".to_string();
            return None;
        };

        let photo = self.run(|c| op(c, path))?;
        self.selected = Some(photo.id);
        Some(photo)
    }

    fn selected_path(&self) -> Option<PathBuf> {
        let id = self.selected?;
        self.coordinator
            .as_ref()?
            .photo_by_id(id)
            .map(|photo| photo.path.clone())
    }

    fn generate_thumbnails(&self) -> Task<Message> {
        let Some(coordinator) = &self.coordinator else {
            return Task::none();
        };
        let jobs = coordinator.pending_thumbnails();
        if jobs.is_empty() {
            return Task::none();
        }

        Task::perform(
            thumbnail::generate_batch(self.thumbnails.clone(), jobs),
            Message::ThumbnailsReady,
        )
    }

    fn report(&mut self, err: &RenamerError) {
        tracing::warn!("{err}");
        self.status = format!("⚠️  {}: {}", err.kind().label(), err);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("photo_renamer=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> iced::Result {
    init_logging();

    iced::application(
        "Photo Renamer",
        PhotoRenamer::update,
        PhotoRenamer::view,
    )
    .theme(PhotoRenamer::theme)
    .subscription(PhotoRenamer::subscription)
    .exit_on_close_request(false)
    .centered()
    .run_with(PhotoRenamer::new)
}
