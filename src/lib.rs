// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod aggregate;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod demo;
pub mod errors;
pub mod gate;
pub mod ledger;
pub mod models;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod utils;
