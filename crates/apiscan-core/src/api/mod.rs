//! The extraction engine
//!
//! [`ApiExtractor`] drives one synchronous pass per compilation unit: the
//! scanner finds the declaring factory call, the builders fill the section
//! mappings, the resolver chases every member value to a terminal type, and
//! the result serializes sparsely as JSON or MessagePack.

mod diagnostics;
mod export;
mod resolver;
mod scanner;
mod sections;
mod types;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use export::ExportError;
pub use scanner::{extract_units, ApiExtractor, FactoryNames};
pub use types::{
    default_requires_doc, default_visibility, is_constant, ApiUnit, ConstructorEntry,
    DeclarationKind, EventEntry, MainInfo, MemberEntry, NamingPolicy, ParamEntry, PropertyEntry,
    StructuralType, Visibility,
};
