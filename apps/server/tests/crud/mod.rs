mod modules;
mod universities;
