// SPDX-FileCopyrightText: The sharecard authors
// SPDX-License-Identifier: MPL-2.0

//! Documentation and output contract

#![doc = include_str!("../README.md")]
