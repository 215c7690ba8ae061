/// User facing outcome of an operation, the terminal equivalent of a toast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Failure(String),
}

impl Notification {
    pub fn success(text: &str) -> Notification {
        return Notification::Success(text.to_string());
    }

    pub fn failure(text: &str) -> Notification {
        return Notification::Failure(text.to_string());
    }

    pub fn text(&self) -> &str {
        match self {
            Notification::Success(text) => return text,
            Notification::Failure(text) => return text,
        }
    }

    pub fn is_failure(&self) -> bool {
        return matches!(self, Notification::Failure(_));
    }
}
