pub mod resolver;

pub use resolver::{resolve_startup, StartupNotice};

/// Panel preselected by the `tab` entry parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelTab {
    #[default]
    Catalog,
    Saved,
}

impl PanelTab {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "saved" => Self::Saved,
            _ => Self::Catalog,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Saved => "saved",
        }
    }
}

/// At most one import runs per page entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupAction {
    LoadOwnedFlow { id: String },
    ClonePublicFlow { slug: String },
}

/// One-shot builder entry parameters. `take_startup` consumes the import
/// parameters; once consumed they cannot fire again, which replaces the
/// "already processed" flags a re-rendering UI would need.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryParams {
    tab: PanelTab,
    load: Option<String>,
    from: Option<String>,
}

impl EntryParams {
    /// Tolerant query-string parse: unknown keys are ignored, empty values
    /// count as absent, percent-encoding is decoded where valid.
    pub fn parse_query(raw: &str) -> Self {
        let mut params = Self::default();
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        for pair in raw.split('&') {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key, value),
                None => continue,
            };
            let value = decode_component(value);
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key {
                "tab" => params.tab = PanelTab::parse(value),
                "load" => params.load = Some(value.to_string()),
                "from" => params.from = Some(value.to_string()),
                _ => {}
            }
        }
        params
    }

    pub fn tab(&self) -> PanelTab {
        self.tab
    }

    pub fn has_pending_startup(&self) -> bool {
        self.load.is_some() || self.from.is_some()
    }

    /// Consumes both import parameters and returns the action to run. The
    /// triggers are mutually exclusive; `load` wins when both are present.
    pub fn take_startup(&mut self) -> Option<StartupAction> {
        let load = self.load.take();
        let from = self.from.take();
        if let Some(id) = load {
            return Some(StartupAction::LoadOwnedFlow { id });
        }
        from.map(|slug| StartupAction::ClonePublicFlow { slug })
    }
}

fn decode_component(value: &str) -> String {
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}
