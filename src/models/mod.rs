//! PhenoTips model types and the client operations that act on them.

mod attachment;
mod object;
mod page;
mod patient;
mod pedigree;
mod schema;
mod vocab;

pub use object::*;
pub use patient::*;
pub use pedigree::*;
pub use schema::*;
pub use vocab::*;

/// Primary property set of a patient record.
pub const OBJECT_CLASS_PATIENT: &str = "PhenoTips.PatientClass";
/// Owner reference (user or group) of a patient record.
pub const OBJECT_CLASS_OWNER: &str = "PhenoTips.OwnerClass";
/// Study reference of a patient record.
pub const OBJECT_CLASS_STUDY_BINDING: &str = "PhenoTips.StudyBindingClass";
pub const OBJECT_CLASS_COLLABORATOR: &str = "PhenoTips.CollaboratorClass";
pub const OBJECT_CLASS_RELATIVE: &str = "PhenoTips.RelativeClass";
pub const OBJECT_CLASS_VCF: &str = "PhenoTips.VCF";
/// Pedigree JSON, stored in the `data` property.
pub const OBJECT_CLASS_PEDIGREE: &str = "PhenoTips.PedigreeClass";
/// Marks a page in the `Studies` space as a study.
pub const OBJECT_CLASS_STUDY: &str = "PhenoTips.StudyClass";
/// Marks a page in the `Groups` space as a work group.
pub const OBJECT_CLASS_GROUP: &str = "PhenoTips.PhenoTipsGroupClass";
/// Marks a page in the `XWiki` space as a user account.
pub const OBJECT_CLASS_USER: &str = "XWiki.XWikiUsers";
