//! `define_port_error!` declares a repository error enum together with one
//! snake_case constructor per variant.
//!
//! Struct-variant fields become `impl Into<T>` parameters, so callers can
//! write `ProfileRepositoryError::duplicate_email("a@b.co")` without an
//! explicit `String` conversion.

macro_rules! define_port_error {
    (
        $(#[$enum_meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (@constructor $variant:ident) => {
        ::paste::paste! {
            #[doc = "Build [`Self::" $variant "`]."]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@accumulate $variant [] [] $( $field : $ty, )*);
    };

    (@accumulate $variant:ident [$($params:tt)*] [$($fields:tt)*]) => {
        ::paste::paste! {
            #[doc = "Build [`Self::" $variant "`]."]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($fields)* }
            }
        }
    };

    (@accumulate $variant:ident [$($params:tt)*] [$($fields:tt)*] $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @accumulate
            $variant
            [$($params)* $field: impl Into<$ty>,]
            [$($fields)* $field: $field.into(),]
            $($rest)*
        );
    };
}

pub(crate) use define_port_error;
