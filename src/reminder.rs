use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderTrigger {
    /// Fires `seconds` after scheduling, and again every `seconds` if `repeats`.
    After { seconds: u64, repeats: bool },
}

/// A local notification request handed to the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Scheduling the same identifier again replaces the pending reminder.
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub trigger: ReminderTrigger,
}

impl Reminder {
    pub fn once_after(identifier: impl Into<String>, title: impl Into<String>, body: impl Into<String>, seconds: u64) -> Self {
        Reminder {
            identifier: identifier.into(),
            title: title.into(),
            body: body.into(),
            trigger: ReminderTrigger::After { seconds, repeats: false },
        }
    }

    pub fn every(identifier: impl Into<String>, title: impl Into<String>, body: impl Into<String>, seconds: u64) -> Self {
        Reminder {
            identifier: identifier.into(),
            title: title.into(),
            body: body.into(),
            trigger: ReminderTrigger::After { seconds, repeats: true },
        }
    }

    /// The nudge scheduled every time the journal list is shown.
    pub fn coffee_visit() -> Self {
        Self::once_after(
            "coffeeReminder",
            "Check Out Your Favorite Coffee Place!",
            "Remember to visit and log new coffee places!",
            5,
        )
    }
}

/// Fire-and-forget scheduler for local reminders.
///
/// The core never reads a result back; implementations log their own failures.
pub trait ReminderService {
    fn schedule(&self, reminder: &Reminder);
}

/// Logs reminders instead of delivering them. Used when the host has not
/// bridged a platform notification center.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReminderService;

impl ReminderService for LogReminderService {
    fn schedule(&self, reminder: &Reminder) {
        info!("Reminder '{}' requested ({:?}): {}", reminder.identifier, reminder.trigger, reminder.title);
    }
}
