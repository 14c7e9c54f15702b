// Copyright 2025 Google LLC
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

use crate::*;

// To be used instead of direct AnimError enum variants in order to debug
// unexpected Err propagations as early as possible in the call stack.
#[allow(dead_code)]
impl AnimError {
    fn on_error() {
        // Use std::intrinsics::breakpoint() or manually add a breakpoint here.
        // Alternatively, uncomment the following to print the stack trace.
        // println!("{}", std::backtrace::Backtrace::force_capture());
    }

    pub(crate) fn invalid_input<T, O>(object: O) -> Result<T, AnimError>
    where
        O: std::fmt::Display,
    {
        AnimError::on_error();
        Err(AnimError::InvalidInput(object.to_string()))
    }
    pub(crate) fn resource_exhausted<T, O>(object: O) -> Result<T, AnimError>
    where
        O: std::fmt::Display,
    {
        AnimError::on_error();
        Err(AnimError::ResourceExhausted(object.to_string()))
    }
    pub(crate) fn no_source_available<T>() -> Result<T, AnimError> {
        AnimError::on_error();
        Err(AnimError::NoSourceAvailable)
    }

    pub(crate) fn map_invalid_input<O>(object: O) -> AnimError
    where
        O: std::fmt::Display,
    {
        AnimError::on_error();
        AnimError::InvalidInput(object.to_string())
    }
    pub(crate) fn map_resource_exhausted<O>(object: O) -> AnimError
    where
        O: std::fmt::Display,
    {
        AnimError::on_error();
        AnimError::ResourceExhausted(object.to_string())
    }
}
