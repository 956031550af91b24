use uuid::Uuid;

/// Entity ids are `<prefix>-<random uuid>`, matching the persisted
/// document format, so exported files merge cleanly across installs.
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

pub fn project_id() -> String {
    new_id("project")
}

pub fn link_id() -> String {
    new_id("link")
}

pub fn tag_id() -> String {
    new_id("tag")
}

pub fn cost_id() -> String {
    new_id("cost")
}

pub fn income_id() -> String {
    new_id("income")
}
