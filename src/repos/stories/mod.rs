/*
 * Responsibility
 * - stories / template_stories の永続化契約と実装
 * - user story は常に所有者 ID で絞り込む
 */
pub mod memory;
pub mod pg;
mod store;

pub use memory::MemoryStoryRepo;
pub use pg::PgStoryRepo;
pub use store::{Story, StoryPage, StoryRepo, TemplateStory};
