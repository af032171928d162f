/// Non-fatal, user-visible message (the terminal source failed, say).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub source: String,
    pub message: String,
}

impl Notice {
    pub fn terminal_failure(source: &str) -> Self {
        Self {
            source: source.to_owned(),
            message: "failed to load API, loading empty list".to_owned(),
        }
    }
}

pub trait Notifier {
    fn notify(&self, notice: &Notice);
}

impl<F: Fn(&Notice)> Notifier for F {
    fn notify(&self, notice: &Notice) {
        self(notice)
    }
}
