//! Operations exposed per resource and the representation each one renders.

use std::fmt;

/// Wire representation selected for a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// Reduced recipe fields used by listings
    Summary,
    /// Full recipe fields used by single-entity operations
    Detail,
    /// Recipe id and image only
    Image,
}

/// How strictly a write payload is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Every required field must be present
    Full,
    /// Only supplied fields are validated and applied
    Partial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeAction {
    List,
    Create,
    Retrieve,
    Update,
    PartialUpdate,
    Destroy,
    UploadImage,
}

impl RecipeAction {
    pub const fn representation(self) -> Representation {
        match self {
            RecipeAction::List => Representation::Summary,
            RecipeAction::UploadImage => Representation::Image,
            RecipeAction::Create
            | RecipeAction::Retrieve
            | RecipeAction::Update
            | RecipeAction::PartialUpdate
            | RecipeAction::Destroy => Representation::Detail,
        }
    }

    pub const fn write_mode(self) -> Option<WriteMode> {
        match self {
            RecipeAction::Create | RecipeAction::Update => Some(WriteMode::Full),
            RecipeAction::PartialUpdate => Some(WriteMode::Partial),
            RecipeAction::List
            | RecipeAction::Retrieve
            | RecipeAction::Destroy
            | RecipeAction::UploadImage => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RecipeAction::List => "list",
            RecipeAction::Create => "create",
            RecipeAction::Retrieve => "retrieve",
            RecipeAction::Update => "update",
            RecipeAction::PartialUpdate => "partial_update",
            RecipeAction::Destroy => "destroy",
            RecipeAction::UploadImage => "upload_image",
        }
    }
}

impl fmt::Display for RecipeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags and ingredients are listed, renamed and deleted; they are created
/// only as a side effect of recipe writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeAction {
    List,
    Update,
    PartialUpdate,
    Destroy,
}

impl AttributeAction {
    pub const fn write_mode(self) -> Option<WriteMode> {
        match self {
            AttributeAction::Update => Some(WriteMode::Full),
            AttributeAction::PartialUpdate => Some(WriteMode::Partial),
            AttributeAction::List | AttributeAction::Destroy => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            AttributeAction::List => "list",
            AttributeAction::Update => "update",
            AttributeAction::PartialUpdate => "partial_update",
            AttributeAction::Destroy => "destroy",
        }
    }
}

impl fmt::Display for AttributeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
