//! # papyrus-clr - Managed bytecode to Papyrus
//!
//! Translates stack-machine bytecode of a managed runtime into Papyrus
//! bytecode, and reads and writes the compiled `.pex` container used by two
//! generations of the Papyrus virtual machine.
//!
//! ## Quick Start
//!
//! ```rust
//! use papyrus_clr::codec::{self, DecodeOptions};
//! use papyrus_clr::translator::{
//!     MethodDecl, MethodRef, SourceBody, SourceModule, TranslateOptions, Translator, TypeDecl,
//!     TypeRef,
//! };
//! use papyrus_clr::VersionTarget;
//!
//! # fn main() -> papyrus_clr::Result<()> {
//! let quest = TypeRef::new("Game", "Quest");
//! let start = MethodRef::new(quest.clone(), "Start")
//!     .param("stage", TypeRef::int32())
//!     .param("flags", TypeRef::int32());
//!
//! let module = SourceModule::new("Quests").with_type(
//!     TypeDecl::new("Game", "Quest")
//!         .method(
//!             MethodDecl::new("Start")
//!                 .static_method()
//!                 .param("stage", TypeRef::int32())
//!                 .param("flags", TypeRef::int32()),
//!         )
//!         .method(
//!             MethodDecl::new("OnInit")
//!                 .body(SourceBody::new().ldc_i4(10).ldc_i4(0).call(start).ret()),
//!         ),
//! );
//!
//! let output = Translator::new(TranslateOptions::new(VersionTarget::Skyrim)).translate(&module)?;
//! let bytes = codec::encode(&output.assembly)?;
//! let decoded = codec::decode(&bytes, DecodeOptions::default())?;
//! assert_eq!(decoded, output.assembly);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SourceModule ─► translator ─► Assembly ─► codec::encode ─► .pex bytes
//!                    │              ▲
//!                 resolver          └──── codec::decode ◄────┘
//! ```
//!
//! - [`translator`]: evaluation stack simulator, instruction processors and
//!   the per-method dispatcher
//! - [`assembly`]: the Papyrus program model
//! - [`resolver`]: jump offsets and label listings
//! - [`codec`]: the binary `.pex` format, big-endian for Skyrim and
//!   little-endian for Fallout 4
//! - [`debug`]: disassembly and JSON dumps
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result`]. Under
//! [`FaultPolicy::Lenient`] a stack underflow drops the offending
//! instruction, a failing method is skipped, and a corrupted string index is
//! clamped; [`FaultPolicy::Strict`] turns each of those into an error.

#![allow(clippy::new_without_default)]

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod assembly;
pub mod codec;
pub mod debug;
pub mod error;
pub mod resolver;
pub mod translator;

pub use assembly::{Assembly, Instruction, OpCode, Value, VersionTarget};
pub use codec::{decode, encode, DecodeOptions};
pub use error::{Error, ErrorSeverity, FaultPolicy, Result};
pub use translator::{TranslateOptions, TranslationOutput, Translator};
