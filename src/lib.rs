// ABOUTME: Main library entry point for the wger MCP server
// ABOUTME: Exposes the wger workout manager REST API as MCP tools over stdio
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

#![deny(unsafe_code)]

//! # wger MCP Server
//!
//! A Model Context Protocol (MCP) server for the [wger](https://wger.de)
//! workout manager. It exposes exercise discovery and workout management as
//! MCP tools so Claude and other assistants can search exercises, inspect
//! reference data, and manage routines on behalf of a user.
//!
//! ## Architecture
//!
//! - **Transport**: outbound HTTP behind a trait seam, reqwest in production
//! - **Auth**: token acquisition, caching, refresh, single-flight coalescing
//! - **Client**: resilient wger API client with retry and error taxonomy
//! - **Cache**: TTL cache with lazy eviction and a periodic sweep
//! - **Tools**: one [`tools::McpTool`] per operation, wired by a registry
//! - **MCP**: JSON-RPC 2.0 over stdio
//!
//! ## Example
//!
//! ```rust,no_run
//! use wger_mcp_server::config::ServerConfig;
//! use wger_mcp_server::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("talking to {}", config.api_url);
//!     Ok(())
//! }
//! ```

/// Token manager for the wger API.
pub mod auth;

/// TTL cache with background sweeping.
pub mod cache;

/// Resilient HTTP client for the wger API.
pub mod client;

/// Environment-based configuration.
pub mod config;

/// Application constants and configuration values.
pub mod constants;

/// Error taxonomy and result alias.
pub mod errors;

/// Model Context Protocol server implementation.
pub mod mcp;

/// Data models for wger API entities.
pub mod models;

/// MCP tool implementations.
pub mod tools;

/// Outbound HTTP transport seam.
pub mod transport;
