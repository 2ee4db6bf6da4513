//! Control-surface state machine. Pure: consumes events, emits commands;
//! the shell around it (`web::popup_ui`) talks to storage, tabs and the
//! content script and feeds the results back in as events.

/// How long the popup waits for a `getState` reply before silently keeping
/// the storage-derived value.
pub const STATE_TIMEOUT_MS: u32 = 1000;

/// How long the popup waits for a `toggle` reply before the offline
/// fallback (persist directly, reload the tab).
pub const TOGGLE_TIMEOUT_MS: u32 = 2000;

/// Substring that identifies a tab as being on the target site.
pub const TARGET_SITE: &str = "leetcode.com";

/// What the popup shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Active tab is not on the target site; the toggle is disabled.
    OffSite,
    /// A toggle round trip is in flight.
    Working,
    /// Settled state: labels hidden (`true`) or visible (`false`).
    Ready(bool),
}

/// Inputs the popup reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupEvent {
    /// Popup opened; the active tab, if one could be determined.
    Opened {
        tab_id: Option<i32>,
        url: Option<String>,
    },
    /// Stored preference arrived.
    PrefLoaded(bool),
    /// `getState` round trip finished. `None` means timeout or no live
    /// controller in the tab.
    LiveState(Option<bool>),
    /// The user clicked the toggle.
    ToggleClicked,
    /// `toggle` round trip finished. `None` means timeout or channel error.
    ToggleResult(Option<bool>),
}

/// Effects the shell must perform, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupCommand {
    LoadPref,
    QueryState { tab_id: i32 },
    SendToggle { tab_id: i32 },
    SavePref(bool),
    Render(Status),
    ReloadTab { tab_id: i32 },
    Close,
}

#[derive(Debug, Default)]
pub struct PopupApp {
    tab_id: Option<i32>,
    on_site: bool,
    enabled: bool,
    /// A live controller answered `getState` for this tab.
    live: bool,
}

impl PopupApp {
    pub fn new() -> Self {
        PopupApp {
            enabled: true,
            ..PopupApp::default()
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn handle(&mut self, event: PopupEvent) -> Vec<PopupCommand> {
        match event {
            PopupEvent::Opened { tab_id, url } => {
                let on_target = url.as_deref().is_some_and(|u| u.contains(TARGET_SITE));
                match (tab_id, on_target) {
                    (Some(id), true) => {
                        self.tab_id = Some(id);
                        self.on_site = true;
                        vec![PopupCommand::LoadPref]
                    }
                    // Off the target site: explain, touch nothing.
                    _ => vec![PopupCommand::Render(Status::OffSite)],
                }
            }
            PopupEvent::PrefLoaded(enabled) if self.on_site => {
                self.enabled = enabled;
                let mut commands = vec![PopupCommand::Render(Status::Ready(enabled))];
                if let Some(tab_id) = self.tab_id {
                    commands.push(PopupCommand::QueryState { tab_id });
                }
                commands
            }
            PopupEvent::LiveState(Some(enabled)) if self.on_site => {
                self.live = true;
                self.enabled = enabled;
                vec![PopupCommand::Render(Status::Ready(enabled))]
            }
            // Timeout or no controller: keep the storage-derived value,
            // no user-facing failure.
            PopupEvent::LiveState(None) => Vec::new(),
            PopupEvent::ToggleClicked if self.on_site => match (self.live, self.tab_id) {
                (true, Some(tab_id)) => {
                    vec![
                        PopupCommand::Render(Status::Working),
                        PopupCommand::SendToggle { tab_id },
                    ]
                }
                _ => self.offline_toggle(),
            },
            PopupEvent::ToggleResult(Some(enabled)) if self.on_site => {
                self.enabled = enabled;
                vec![PopupCommand::Render(Status::Ready(enabled))]
            }
            PopupEvent::ToggleResult(None) if self.on_site => {
                self.live = false;
                self.offline_toggle()
            }
            _ => Vec::new(),
        }
    }

    /// No live controller to apply the change: flip and persist directly,
    /// then reload the tab so the next page load picks the value up, and
    /// close.
    fn offline_toggle(&mut self) -> Vec<PopupCommand> {
        self.enabled = !self.enabled;
        let mut commands = vec![
            PopupCommand::SavePref(self.enabled),
            PopupCommand::Render(Status::Ready(self.enabled)),
        ];
        if let Some(tab_id) = self.tab_id {
            commands.push(PopupCommand::ReloadTab { tab_id });
            commands.push(PopupCommand::Close);
        }
        commands
    }
}
