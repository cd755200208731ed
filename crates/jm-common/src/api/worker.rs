use serde::{Deserialize, Serialize};

/// A registered laborer. Persisted as one element of the workers document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: u64,
    pub name: String,
    pub location: String,
    pub skills: String,
    pub experience: String,
    pub phone_number: String,
}

/// Worker sign-up form. Every field defaults to empty so that a missing form
/// field surfaces as a presence-check failure instead of a decode rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRegistration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub phone_number: String,
}

impl WorkerRegistration {
    pub(crate) fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("name", self.name.as_str()),
            ("location", self.location.as_str()),
            ("skills", self.skills.as_str()),
            ("experience", self.experience.as_str()),
            ("phone_number", self.phone_number.as_str()),
        ]
    }

    pub(crate) fn into_worker(self, id: u64) -> Worker {
        Worker {
            id,
            name: self.name,
            location: self.location,
            skills: self.skills,
            experience: self.experience,
            phone_number: self.phone_number,
        }
    }
}
