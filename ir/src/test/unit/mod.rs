mod constructors;
mod reduction;
mod substitute;
