//! Macros for declaring stage marker sequences.

/// Declare a stage's marker enum and implement [`Marker`](crate::core::Marker) for it.
///
/// Variants are listed in progression order, each with its step key. The key
/// is what the marker serializes to and what [`Marker::name`](crate::core::Marker::name)
/// returns.
///
/// # Example
///
/// ```
/// use hubbleds::core::Marker;
/// use hubbleds::marker_enum;
///
/// marker_enum! {
///     pub enum IntroMarker {
///         Welcome => "wel_com1",
///         Explore => "exp_lor1",
///     }
/// }
///
/// assert_eq!(IntroMarker::Explore.name(), "exp_lor1");
/// assert_eq!(IntroMarker::last(), IntroMarker::Explore);
/// ```
#[macro_export]
macro_rules! marker_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $key:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Debug,
            serde::Serialize,
            serde::Deserialize
        )]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $key)]
                $variant
            ),+
        }

        impl $crate::core::Marker for $name {
            const SEQUENCE: &'static [Self] = &[$(Self::$variant),+];

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $key),+
                }
            }

            fn ordinal(&self) -> usize {
                *self as usize
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::core::Marker::name(self))
            }
        }
    };
}
