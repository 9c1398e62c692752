/// Inbound commands. Every front end goes through [super::PomodoroTimer::dispatch].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Start,
    StopResumeOrStart,
    Clear,
    SwitchMode,
    StartFocusing,
    StartResting,
    /// Pauses a running countdown, ignored otherwise.
    Stop,
}

pub struct MenuEntry {
    pub label: &'static str,
    pub keywords: &'static [&'static str],
    pub command: TimerCommand,
}

/// Commands offered to the user, built once.
pub const MENU: &[MenuEntry] = &[
    MenuEntry {
        label: "Start / Pause / Resume",
        keywords: &["toggle", "t", "space"],
        command: TimerCommand::StopResumeOrStart,
    },
    MenuEntry {
        label: "Start Focusing",
        keywords: &["focus", "f"],
        command: TimerCommand::StartFocusing,
    },
    MenuEntry {
        label: "Start Resting",
        keywords: &["rest", "r"],
        command: TimerCommand::StartResting,
    },
    MenuEntry {
        label: "Stop",
        keywords: &["stop", "s"],
        command: TimerCommand::Stop,
    },
    MenuEntry {
        label: "Clear",
        keywords: &["clear", "c"],
        command: TimerCommand::Clear,
    },
    MenuEntry {
        label: "Switch Mode",
        keywords: &["switch", "m"],
        command: TimerCommand::SwitchMode,
    },
];

impl TimerCommand {
    pub fn from_keyword(keyword: &str) -> Option<TimerCommand> {
        let keyword = keyword.trim().to_lowercase();
        MENU.iter()
            .find(|entry| entry.keywords.contains(&keyword.as_str()))
            .map(|entry| entry.command)
    }
}

#[cfg(test)]
mod tests {
    use super::{TimerCommand, MENU};

    #[test]
    fn keywords_resolve_to_commands() {
        assert_eq!(
            TimerCommand::from_keyword(" Focus "),
            Some(TimerCommand::StartFocusing)
        );
        assert_eq!(TimerCommand::from_keyword("c"), Some(TimerCommand::Clear));
        assert_eq!(TimerCommand::from_keyword("dance"), None);
    }

    #[test]
    fn keywords_are_unique() {
        let mut keywords = MENU
            .iter()
            .flat_map(|entry| entry.keywords.iter())
            .collect::<Vec<_>>();
        let total = keywords.len();
        keywords.sort();
        keywords.dedup();
        assert_eq!(keywords.len(), total);
    }
}
