//! Helper macro for declaring driven-port error enums.
//!
//! Each variant gets a snake_case constructor whose fields accept anything
//! convertible into the declared type, so adapters can write
//! `DatabaseError::query(Collection::Invoices, err.to_string())`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
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
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructor and message coverage for generated port errors.
    define_port_error! {
        pub enum StorePortError {
            Unreachable { host: String } => "store unreachable: {host}",
            Timeout { millis: u64 } => "store timed out after {millis}ms",
            Rejected { collection: String, code: i32 } => "{collection} rejected write ({code})",
        }
    }

    #[test]
    fn string_fields_accept_borrowed_text() {
        let err = StorePortError::unreachable("db.internal");
        assert_eq!(err.to_string(), "store unreachable: db.internal");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        let err = StorePortError::timeout(250_u64);
        assert_eq!(err.to_string(), "store timed out after 250ms");
    }

    #[test]
    fn mixed_fields_are_positional() {
        let err = StorePortError::rejected("invoices", 11_000);
        assert_eq!(
            err,
            StorePortError::Rejected {
                collection: "invoices".to_owned(),
                code: 11_000,
            }
        );
        assert_eq!(err.to_string(), "invoices rejected write (11000)");
    }
}
