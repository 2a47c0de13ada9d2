/// Collects every problem with a request before reporting, so a client sees
/// all of them at once instead of fixing one field per round trip.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Record `field is required` when `value` is empty after trimming.
    pub fn require(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(format!("{field} is required"));
        }
        self
    }

    /// Record a violation when `value` is longer than `max` bytes.
    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.len() > max {
            self.push(format!("{field} must be at most {max} bytes"));
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: i32) -> &mut Self {
        if value < 0 {
            self.push(format!("{field} must be >= 0"));
        }
        self
    }

    /// Loose address shape check: exactly one `@` with something on each side.
    pub fn mail_address(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if value.is_empty() {
            return self;
        }
        let valid = match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            }
            None => false,
        };
        if !valid {
            self.push(format!("{field} is not a valid mail address"));
        }
        self
    }

    /// `Ok(())` when nothing was recorded, otherwise all messages joined by `"; "`.
    pub fn finish(self) -> Result<(), String> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0.join("; "))
        }
    }
}
