//! Angkot ledger
//!
//! Bot de chat que registra los trayectos de un servicio de transporte
//! escolar, calcula las tarifas de ida y vuelta y genera reportes diarios
//! por driver.

pub mod cache;
pub mod clients;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod polling;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
