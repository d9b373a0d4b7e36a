// ABOUTME: Model Context Protocol layer: wire types and the stdio server loop
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! Model Context Protocol server implementation.

pub mod schema;
pub mod server;
