mod commands;
mod transactions;
