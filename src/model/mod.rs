pub(crate) mod character;
