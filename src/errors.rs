//////////////////////////////////////////////////////////////////////
// use error chain so we can use Result<> everywhere
// for error handling

error_chain! {

    errors {

        // bad type name, edge index, depth, window or color
        InvalidArgument(msg: String) {
            description("invalid argument")
            display("invalid argument: {}", msg)
        }

        // (parent type, parent edge, neighbor type) not in the
        // superneighborhood table
        MissingRule(parent: &'static str, edge: usize, neighbor: &'static str) {
            description("missing superneighborhood rule")
            display("unhandled superneighborhood combination ({}, {}, {})",
                    parent, edge, neighbor)
        }

    }

    foreign_links {
        Fmt(::std::fmt::Error);
        Io(::std::io::Error);
        ParseFloat(::std::num::ParseFloatError);
        ParseInt(::std::num::ParseIntError);
    }

}

// shorthand for the most common failure
pub fn invalid<S: Into<String>>(msg: S) -> Error {
    ErrorKind::InvalidArgument(msg.into()).into()
}
