/// Declare a registry: a struct of named [`Channel`](crate::events::Channel)s.
///
/// Each `field: Payload` entry becomes a public `Channel<Payload>` field
/// named after the field, plus an associated [`EventKey`](crate::core::EventKey)
/// constant in upper case. Unknown names and wrong payload types are
/// compile errors when going through the keys.
///
/// ```rust,ignore
/// event_registry! {
///     pub struct ModalEvents {
///         on_open_modal: OpenModal,
///         on_close_all: (),
///     }
/// }
///
/// let manager = create_event_manager(ModalEvents::new());
/// let open = manager.registry().get(ModalEvents::ON_OPEN_MODAL);
/// ```
#[macro_export]
macro_rules! event_registry {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $payload:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $crate::events::Channel<$payload>,
            )*
        }

        #[allow(dead_code)]
        impl $name {
            /// Build every channel with default options
            pub fn new() -> Self {
                Self::with_options($crate::events::ChannelOptions::default())
            }

            /// Build every channel with the same options
            #[allow(unused_variables)]
            pub fn with_options(options: $crate::events::ChannelOptions) -> Self {
                Self {
                    $(
                        $field: $crate::events::Channel::with_options(options.clone())
                            .named(stringify!($field)),
                    )*
                }
            }
        }

        $crate::__private::paste::paste! {
            #[allow(dead_code)]
            impl $name {
                $(
                    pub const [<$field:upper>]: $crate::core::EventKey<$name, $payload> = {
                        fn select(events: &$name) -> &$crate::events::Channel<$payload> {
                            &events.$field
                        }
                        $crate::core::EventKey::new(stringify!($field), select)
                    };
                )*
            }
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $crate::core::EventMap for $name {
            const NAMES: &'static [&'static str] = &[$(stringify!($field)),*];

            #[allow(unused_variables)]
            fn channel_by_name(&self, name: &str) -> Option<&dyn $crate::core::AnyChannel> {
                $(
                    if name == stringify!($field) {
                        return Some(&self.$field);
                    }
                )*
                None
            }
        }
    };
}
