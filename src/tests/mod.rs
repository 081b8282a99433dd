mod helper;
mod login;
mod public_entries;
