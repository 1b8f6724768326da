//! Integer identifiers used across the commit pipeline and the ivr worker

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(
    /// Database id of a contact
    ContactId
);
id_type!(
    /// Database id of an org
    OrgId
);
id_type!(
    /// Database id of a flow
    FlowId
);
id_type!(
    /// Database id of a flow start
    StartId
);
id_type!(
    /// Database id of a message
    MsgId
);
id_type!(
    /// Database id of a label
    LabelId
);
id_type!(
    /// Database id of a flow session
    SessionId
);
id_type!(
    /// Arena index of a scene within one processing pass
    SceneId
);
