//! Reference entities: small named lookup tables
//!
//! College, Funnel, LessonLocation, LessonSubject and PaymentMethod all have
//! the same `{id, name}` shape. Each gets its own row type (so JSON keeps the
//! entity-specific id field, e.g. `college_id`) and implements [`Reference`],
//! which queries, handlers and tests are generic over.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::FromRow;

/// The five kinds of reference entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    College,
    Funnel,
    LessonLocation,
    LessonSubject,
    PaymentMethod,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 5] = [
        Self::College,
        Self::Funnel,
        Self::LessonLocation,
        Self::LessonSubject,
        Self::PaymentMethod,
    ];

    /// Human-readable entity name, used in response messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::College => "College",
            Self::Funnel => "Funnel",
            Self::LessonLocation => "LessonLocation",
            Self::LessonSubject => "LessonSubject",
            Self::PaymentMethod => "PaymentMethod",
        }
    }

    /// Resource name used in not-found errors
    pub fn resource(&self) -> &'static str {
        match self {
            Self::College => "college",
            Self::Funnel => "funnel",
            Self::LessonLocation => "lesson location",
            Self::LessonSubject => "lesson subject",
            Self::PaymentMethod => "payment method",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Self::College => "colleges",
            Self::Funnel => "funnels",
            Self::LessonLocation => "lesson_locations",
            Self::LessonSubject => "lesson_subjects",
            Self::PaymentMethod => "payment_methods",
        }
    }

    /// Primary key column, also the id field name in JSON bodies
    pub fn id_column(&self) -> &'static str {
        match self {
            Self::College => "college_id",
            Self::Funnel => "funnel_id",
            Self::LessonLocation => "location_id",
            Self::LessonSubject => "subject_id",
            Self::PaymentMethod => "payment_method_id",
        }
    }

    pub fn collection_path(&self) -> &'static str {
        match self {
            Self::College => "/colleges",
            Self::Funnel => "/funnels",
            Self::LessonLocation => "/lesson_locations",
            Self::LessonSubject => "/lesson_subjects",
            Self::PaymentMethod => "/payment_methods",
        }
    }

    pub fn item_path(&self) -> &'static str {
        match self {
            Self::College => "/colleges/{id}",
            Self::Funnel => "/funnels/{id}",
            Self::LessonLocation => "/lesson_locations/{id}",
            Self::LessonSubject => "/lesson_subjects/{id}",
            Self::PaymentMethod => "/payment_methods/{id}",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Capability set shared by all reference entities.
pub trait Reference:
    for<'r> FromRow<'r, PgRow>
    + Serialize
    + DeserializeOwned
    + Clone
    + std::fmt::Debug
    + PartialEq
    + Send
    + Sync
    + Unpin
    + 'static
{
    const KIND: ReferenceKind;

    fn from_parts(id: i64, name: String) -> Self;

    fn id(&self) -> i64;

    fn name(&self) -> &str;
}

macro_rules! reference_entity {
    ($(#[$meta:meta])* $ty:ident, $kind:ident, $id:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
        pub struct $ty {
            pub $id: i64,
            pub name: String,
        }

        impl Reference for $ty {
            const KIND: ReferenceKind = ReferenceKind::$kind;

            fn from_parts(id: i64, name: String) -> Self {
                Self { $id: id, name }
            }

            fn id(&self) -> i64 {
                self.$id
            }

            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

reference_entity!(
    /// College a student attends
    College, College, college_id
);
reference_entity!(
    /// Marketing funnel a student arrived through
    Funnel, Funnel, funnel_id
);
reference_entity!(
    /// Where a lesson takes place
    LessonLocation, LessonLocation, location_id
);
reference_entity!(
    /// What a lesson covers
    LessonSubject, LessonSubject, subject_id
);
reference_entity!(
    /// How a payment was made (cash, transfer, ...)
    PaymentMethod, PaymentMethod, payment_method_id
);
