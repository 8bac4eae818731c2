/// Declares a C-like enum over `u8` values along with a fallible
/// `from_u8` constructor. Unrecognized values map to `None`, which is
/// how reserved wire bytes get ignored rather than trapped.
#[macro_export]
macro_rules! c_like_enum {
    ( $name: ident { $($variant: ident = $value: expr,)* } ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant = $value,)+
        }

        impl $name {
            pub fn from_u8(value: u8) -> Option<$name> {
                match value {
                    $($value => Some($name::$variant),)+
                    _ => None
                }
            }
        }
    };
}
