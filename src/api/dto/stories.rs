/*
 * Responsibility
 * - Story / TemplateStory の request/response DTO
 * - domain (repos::stories) との変換
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::stories::{Story, StoryPage, TemplateStory};
use crate::services::validation::{Validate, Validator};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoryPageRequest {
    #[serde(alias = "imageId")]
    pub image_id: Option<Uuid>,
    #[serde(alias = "imageExtension")]
    pub image_extension: Option<String>,
    #[serde(alias = "description")]
    pub description: Option<String>,
}

impl Validate for StoryPageRequest {
    fn validate(&self, v: &mut Validator) {
        v.require("ImageId", self.image_id.as_ref());
        v.field("ImageExtension", self.image_extension.as_deref())
            .required();
        v.field("Description", self.description.as_deref()).required();
    }
}

impl StoryPageRequest {
    /// Call after validation; absent fields fall back to empty values.
    pub fn to_page(&self) -> StoryPage {
        StoryPage {
            image_id: self.image_id.unwrap_or_default(),
            image_extension: self.image_extension.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
        }
    }
}

fn validate_story_body(
    v: &mut Validator,
    title: Option<&StoryPageRequest>,
    pages: Option<&[StoryPageRequest]>,
    font_type: Option<&str>,
) {
    v.nested("TitleStoryPage", title);
    v.each("Pages", pages);
    v.field("FontType", font_type).required();
}

fn to_pages(pages: &Option<Vec<StoryPageRequest>>) -> Vec<StoryPage> {
    pages
        .iter()
        .flatten()
        .map(StoryPageRequest::to_page)
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadStoryRequest {
    #[serde(alias = "titleStoryPage")]
    pub title_story_page: Option<StoryPageRequest>,
    // Derived from `Pages` on read; accepted and ignored.
    #[serde(alias = "pageCount")]
    pub page_count: Option<i64>,
    #[serde(alias = "pages")]
    pub pages: Option<Vec<StoryPageRequest>>,
    #[serde(alias = "fontType")]
    pub font_type: Option<String>,
}

impl Validate for UploadStoryRequest {
    fn validate(&self, v: &mut Validator) {
        validate_story_body(
            v,
            self.title_story_page.as_ref(),
            self.pages.as_deref(),
            self.font_type.as_deref(),
        );
    }
}

impl UploadStoryRequest {
    pub fn into_story(self, id: Uuid, user_id: Uuid) -> Story {
        Story {
            id,
            user_id,
            font_type: self.font_type.clone().unwrap_or_default(),
            title_page: self
                .title_story_page
                .as_ref()
                .map(StoryPageRequest::to_page)
                .unwrap_or_else(empty_page),
            pages: to_pages(&self.pages),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateStoryRequest {
    #[serde(alias = "id")]
    pub id: Option<Uuid>,
    #[serde(alias = "titleStoryPage")]
    pub title_story_page: Option<StoryPageRequest>,
    #[serde(alias = "pageCount")]
    pub page_count: Option<i64>,
    #[serde(alias = "pages")]
    pub pages: Option<Vec<StoryPageRequest>>,
    #[serde(alias = "fontType")]
    pub font_type: Option<String>,
}

impl Validate for UpdateStoryRequest {
    fn validate(&self, v: &mut Validator) {
        v.require("Id", self.id.as_ref());
        validate_story_body(
            v,
            self.title_story_page.as_ref(),
            self.pages.as_deref(),
            self.font_type.as_deref(),
        );
    }
}

impl UpdateStoryRequest {
    pub fn story_id(&self) -> Uuid {
        self.id.unwrap_or_default()
    }

    pub fn into_story(self, user_id: Uuid) -> Story {
        Story {
            id: self.story_id(),
            user_id,
            font_type: self.font_type.clone().unwrap_or_default(),
            title_page: self
                .title_story_page
                .as_ref()
                .map(StoryPageRequest::to_page)
                .unwrap_or_else(empty_page),
            pages: to_pages(&self.pages),
        }
    }
}

fn empty_page() -> StoryPage {
    StoryPage {
        image_id: Uuid::nil(),
        image_extension: String::new(),
        description: String::new(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryQuery {
    #[serde(alias = "StoryId")]
    pub story_id: Option<Uuid>,
}

impl Validate for StoryQuery {
    fn validate(&self, v: &mut Validator) {
        v.require("storyId", self.story_id.as_ref());
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoryPageDto {
    pub image_id: Uuid,
    pub image_extension: String,
    pub description: String,
}

impl From<StoryPage> for StoryPageDto {
    fn from(p: StoryPage) -> Self {
        Self {
            image_id: p.image_id,
            image_extension: p.image_extension,
            description: p.description,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoryDto {
    pub id: Uuid,
    pub title_story_page: StoryPageDto,
    pub page_count: usize,
    pub pages: Vec<StoryPageDto>,
    pub font_type: String,
}

impl From<Story> for StoryDto {
    fn from(s: Story) -> Self {
        Self {
            id: s.id,
            title_story_page: s.title_page.into(),
            page_count: s.pages.len(),
            pages: s.pages.into_iter().map(StoryPageDto::from).collect(),
            font_type: s.font_type,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoriesDto {
    pub stories: Vec<StoryDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadTemplateStoryRequest {
    #[serde(alias = "type")]
    pub r#type: Option<String>,
    #[serde(alias = "title")]
    pub title: Option<String>,
    #[serde(alias = "pageDescriptions")]
    pub page_descriptions: Option<Vec<String>>,
}

impl Validate for UploadTemplateStoryRequest {
    fn validate(&self, v: &mut Validator) {
        v.field("Type", self.r#type.as_deref()).required();
        v.field("Title", self.title.as_deref()).required();
        v.require("PageDescriptions", self.page_descriptions.as_ref());
    }
}

impl UploadTemplateStoryRequest {
    pub fn into_template(self, id: Uuid) -> TemplateStory {
        TemplateStory {
            id,
            story_type: self.r#type.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            page_descriptions: self.page_descriptions.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateStoryDto {
    pub id: Uuid,
    pub r#type: String,
    pub title: String,
    pub page_descriptions: Vec<String>,
}

impl From<TemplateStory> for TemplateStoryDto {
    fn from(t: TemplateStory) -> Self {
        Self {
            id: t.id,
            r#type: t.story_type,
            title: t.title,
            page_descriptions: t.page_descriptions,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateStoriesDto {
    pub stories: Vec<TemplateStoryDto>,
}
