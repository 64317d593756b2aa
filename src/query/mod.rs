// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! SQL generation
//!
//! Pure functions only: nothing in this module touches a connection, so it
//! is safe to call from any number of threads.
//!
//! - [`encoder`] - [`Value`](crate::Value) to SQL literal
//! - [`filter`] - raw filter document to [`FilterExpression`] tree
//! - [`compiler`] - [`FilterExpression`] tree to WHERE condition text
//! - [`descriptor`] - immutable [`Query`] descriptors
//! - [`builder`] - full statement text

pub mod builder;
pub mod compiler;
pub mod descriptor;
pub mod encoder;
pub mod filter;

pub use builder::{build_count, build_delete, build_insert, build_select, build_update, CountSpec};
pub use compiler::{compile, compile_with, render};
pub use descriptor::{Query, Source};
pub use encoder::encode;
pub use filter::{normalize, FilterExpression, Operand};
