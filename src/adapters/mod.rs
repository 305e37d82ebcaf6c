//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements            | Connects to                   |
//! |------------|-----------------------|-------------------------------|
//! | `console`  | KeypadPort            | scripted key sequence         |
//! |            | DisplayPort           | 4-row text buffer + logger    |
//! | `eeprom`   | StoragePort           | 1 KiB image (optional file)   |
//! |            | ConfigPort            | postcard block at `0x100`     |
//! | `gpio`     | OutputPin, SetDutyCycle | shared simulated levels     |
//! | `hardware` | DoorPort, AlarmPort   | door motor + alarm drivers    |
//! | `link`     | LinkPort              | in-memory channel pair        |
//! | `log_sink` | EventSink             | console log output            |

pub mod console;
pub mod eeprom;
pub mod gpio;
pub mod hardware;
pub mod link;
pub mod log_sink;
