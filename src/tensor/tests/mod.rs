mod new;
mod shape;
