//! Domain entities.
//!
//! Each entity comes with a `New*` record (what a store needs to insert it)
//! and, where updates are allowed, a `*Changes` patch record whose `None`
//! fields mean "leave unchanged".

mod activity;
mod card;
mod enums;
mod notification;
mod share;
mod token;
mod user;

pub use activity::{Activity, ActivityStats, ActivityWithCard, CompletedCard, NewActivity};
pub use card::{Card, CardChanges, CardFilter, CardTotals, NewCard};
pub use enums::{Gender, Interest, SocialProvider};
pub use notification::{NewNotification, Notification, NotificationStats};
pub use share::{NewShare, Share, ShareChanges, ShareStats};
pub use token::{NewRefreshToken, RefreshToken};
pub use user::{Credentials, NewUser, User, UserChanges};
