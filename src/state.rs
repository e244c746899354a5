use std::collections::VecDeque;

use crate::report::MatchReport;
use crate::stats::PeriodStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Overview,
    Players,
    Shots,
    Momentum,
    Prompt,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Overview,
        Screen::Players,
        Screen::Shots,
        Screen::Momentum,
        Screen::Prompt,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Screen::Overview => "OVERVIEW",
            Screen::Players => "PLAYERS",
            Screen::Shots => "SHOTS",
            Screen::Momentum => "MOMENTUM",
            Screen::Prompt => "PROMPT",
        }
    }

    pub fn next(self) -> Screen {
        let idx = Screen::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Screen::ALL[(idx + 1) % Screen::ALL.len()]
    }

    pub fn from_digit(ch: char) -> Option<Screen> {
        let idx = ch.to_digit(10)? as usize;
        Screen::ALL.get(idx.checked_sub(1)?).copied()
    }
}

pub struct AppState {
    pub report: MatchReport,
    pub screen: Screen,
    pub scroll: u16,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    /// 0 is the full match, `n` is `report.stats.periods[n - 1]`.
    pub period: usize,
}

impl AppState {
    pub fn new(report: MatchReport) -> Self {
        Self {
            report,
            screen: Screen::Overview,
            scroll: 0,
            help_overlay: false,
            logs: VecDeque::new(),
            period: 0,
        }
    }

    pub fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            self.screen = screen;
            self.scroll = 0;
        }
    }

    pub fn next_screen(&mut self) {
        self.set_screen(self.screen.next());
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn cycle_period(&mut self) {
        let count = self.report.stats.periods.len() + 1;
        self.period = (self.period + 1) % count;
    }

    pub fn selected_period(&self) -> Option<&PeriodStats> {
        self.period
            .checked_sub(1)
            .and_then(|idx| self.report.stats.periods.get(idx))
    }

    pub fn period_label(&self) -> String {
        self.selected_period()
            .map(PeriodStats::label)
            .unwrap_or_else(|| "Full match".to_string())
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}
