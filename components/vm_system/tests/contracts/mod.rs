//! Contract tests for the stack-machine wire format

mod test_wire_format;
