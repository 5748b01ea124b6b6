//! Unit test runner for vm_system

mod test_chunk;
mod test_opcode;
