pub mod playlist;
pub mod user;
pub mod video;

pub use playlist::{Playlist, WatchEntry};
pub use user::{Channel, SubscribedChannel, User, UserView};
pub use video::{format_duration, Comment, Like, Subscription, Video};
