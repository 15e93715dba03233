// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

use super::addr::{self, Symbolic};
use super::constant::{self, Area, BlockLang, CpuStatus, SubBlockType};
use super::datetime;
use super::error::{self, Error};
use super::transport::{self, Transport};
use byteorder::{BigEndian, ByteOrder};
use chrono::{NaiveDate, NaiveDateTime};
use std::str;

/// One item of a multi-read or multi-write request.
#[derive(Debug, Clone)]
pub struct DataItem {
    pub area: Area,
    pub word_len: i32,
    pub db_number: i32,
    pub start: i32,
    /// bit position within `start`, only meaningful for `WL_BIT` items (0..7)
    pub bit_offset: i32,
    pub amount: i32,
    pub buffer: Vec<u8>,
    pub error: Option<Error>,
}

impl DataItem {
    pub fn new(area: Area, word_len: i32, db_number: i32, start: i32, amount: i32) -> DataItem {
        let size = (amount * constant::data_size_byte(word_len)) as usize;
        DataItem {
            area,
            word_len,
            db_number,
            start,
            bit_offset: 0,
            amount,
            buffer: vec![0u8; size],
            error: None,
        }
    }

    /// Builds a single-bit item addressing bit `bit` (0..7) of byte `start`.
    pub fn new_bit(area: Area, db_number: i32, start: i32, bit: i32) -> DataItem {
        DataItem {
            area,
            word_len: constant::WL_BIT,
            db_number,
            start,
            bit_offset: bit,
            amount: 1,
            buffer: vec![0u8; 1],
            error: None,
        }
    }
}

/// Result of `read_symbolic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Byte(u8),
    Word(u16),
    DWord(u32),
    Bit(bool),
}

/// Per block-type directory listing, each entry a block number.
#[derive(Debug, Clone, Default)]
pub struct BlockList {
    pub ob: Vec<i32>,
    pub db: Vec<i32>,
    pub sdb: Vec<i32>,
    pub fc: Vec<i32>,
    pub sfc: Vec<i32>,
    pub fb: Vec<i32>,
    pub sfb: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct BlockInfo {
    pub block_type: SubBlockType,
    pub block_number: u16,
    pub block_lang: BlockLang,
    pub block_flags: u8,
    pub mc7_size: u16,
    pub load_size: u32,
    pub local_data: u16,
    pub sbb_length: u16,
    pub version: u8,
    pub checksum: u16,
    pub code_date: NaiveDate,
    pub interface_date: NaiveDate,
    pub author: String,
    pub family: String,
    pub header: String,
}

#[derive(Debug, Clone)]
pub struct Protection {
    pub sch_schal: u16,
    pub sch_par: u16,
    pub sch_rel: u16,
    pub bart_sch: u16,
    pub anl_sch: u16,
}

#[derive(Debug, Clone)]
pub struct CpuInfo {
    pub module_type_name: String,
    pub serial_number: String,
    pub as_name: String,
    pub copyright: String,
    pub module_name: String,
}

#[derive(Debug, Clone)]
pub struct CpInfo {
    pub max_pdu_length: u16,
    pub max_connections: u16,
    pub max_mpi_rate: u32,
    pub max_bus_rate: u32,
}

#[derive(Debug, Clone)]
pub struct OrderCode {
    pub code: String,
    pub v1: u8,
    pub v2: u8,
    pub v3: u8,
}

/// Swaps each little-endian wire pair into a big-endian `u16` in place.
/// Used for timer/counter elements, which the PLC sends byte-swapped.
fn swap_word_pairs(buffer: &mut [u8]) {
    for pair in buffer.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
}

fn trimmed(bytes: &[u8]) -> Result<String, Error> {
    str::from_utf8(bytes)
        .map(|s| s.trim_matches(char::from(0)).trim().to_string())
        .map_err(|e| Error::InvalidResponse {
            reason: e.to_string(),
            bytes: bytes.to_vec(),
        })
}

/// Client allows for communication with S7 family devices over any
/// [`Transport`] implementor, independent of connection personality
/// (PG/OP/Basic), which is established once at transport-construction time.
#[derive(Debug, Clone)]
pub struct Client<T: Transport> {
    transport: T,
}

impl<T: Transport> Client<T> {
    pub fn new(mut transport: T) -> Result<Client<T>, Error> {
        transport.negotiate()?;
        Ok(Client { transport })
    }

    /// Closes the underlying connection explicitly, ahead of `Drop`.
    pub fn close(&mut self) -> Result<(), Error> {
        self.transport.close()
    }

    /// # Examples
    ///
    /// ```no_run
    /// use std::net::{Ipv4Addr, IpAddr};
    /// use s7_client::{client, tcp, transport};
    /// use std::time::Duration;
    ///
    /// let addr = Ipv4Addr::new(127, 0, 0, 1);
    /// let mut opts = tcp::Options::new(IpAddr::from(addr), 5, 5, transport::Connection::PG);
    ///
    /// opts.read_timeout = Duration::from_secs(2);
    /// opts.write_timeout = Duration::from_secs(2);
    ///
    /// let t = tcp::Transport::connect(opts).unwrap();
    /// let mut cl = client::Client::new(t).unwrap();
    ///
    /// let buffer = &mut vec![0u8; 1];
    ///
    /// match cl.db_read(888, 8, 1, buffer) {
    ///       Ok(()) => println!("buffer: {:?}", buffer),
    ///       Err(e) => println!("error: {:?}", e)
    /// }
    /// ```
    pub fn db_read(
        &mut self,
        db_number: i32,
        start: i32,
        size: i32,
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        self.read(
            Area::DataBausteine,
            db_number,
            start,
            size,
            constant::WL_BYTE,
            buffer,
        )
    }

    pub fn db_write(
        &mut self,
        db_number: i32,
        start: i32,
        size: i32,
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        self.write(
            Area::DataBausteine,
            db_number,
            start,
            size,
            constant::WL_BYTE,
            buffer,
        )
    }

    pub fn mb_read(&mut self, start: i32, size: i32, buffer: &mut [u8]) -> Result<(), Error> {
        self.read(Area::Merker, 0, start, size, constant::WL_BYTE, buffer)
    }

    pub fn mb_write(&mut self, start: i32, size: i32, buffer: &mut [u8]) -> Result<(), Error> {
        self.write(Area::Merker, 0, start, size, constant::WL_BYTE, buffer)
    }

    pub fn eb_read(&mut self, start: i32, size: i32, buffer: &mut [u8]) -> Result<(), Error> {
        self.read(
            Area::ProcessInput,
            0,
            start,
            size,
            constant::WL_BYTE,
            buffer,
        )
    }

    pub fn eb_write(&mut self, start: i32, size: i32, buffer: &mut [u8]) -> Result<(), Error> {
        self.write(
            Area::ProcessInput,
            0,
            start,
            size,
            constant::WL_BYTE,
            buffer,
        )
    }

    pub fn ab_read(&mut self, start: i32, size: i32, buffer: &mut [u8]) -> Result<(), Error> {
        self.read(
            Area::ProcessOutput,
            0,
            start,
            size,
            constant::WL_BYTE,
            buffer,
        )
    }

    pub fn ab_write(&mut self, start: i32, size: i32, buffer: &mut [u8]) -> Result<(), Error> {
        self.write(
            Area::ProcessOutput,
            0,
            start,
            size,
            constant::WL_BYTE,
            buffer,
        )
    }

    /// Reads `size` timer values (each a proper 16-bit word, not truncated) into `buffer`.
    ///
    /// On the wire each timer/counter element is a little-endian pair; this swaps every
    /// pair into a big-endian `u16` in `buffer` rather than truncating it into one byte
    /// (see the teacher's `AGReadTM`/`AGReadCT`, which do the latter).
    pub fn tm_read(&mut self, start: i32, size: i32, buffer: &mut [u8]) -> Result<(), Error> {
        self.read(Area::Timer, 0, start, size, constant::WL_TIMER, buffer)?;
        swap_word_pairs(buffer);
        Ok(())
    }

    pub fn tm_write(&mut self, start: i32, size: i32, buffer: &mut [u8]) -> Result<(), Error> {
        let mut wire = buffer.to_vec();
        swap_word_pairs(&mut wire);
        self.write(Area::Timer, 0, start, size, constant::WL_TIMER, &mut wire)
    }

    pub fn ct_read(&mut self, start: i32, size: i32, buffer: &mut [u8]) -> Result<(), Error> {
        self.read(Area::Counter, 0, start, size, constant::WL_COUNTER, buffer)?;
        swap_word_pairs(buffer);
        Ok(())
    }

    pub fn ct_write(&mut self, start: i32, size: i32, buffer: &mut [u8]) -> Result<(), Error> {
        let mut wire = buffer.to_vec();
        swap_word_pairs(&mut wire);
        self.write(Area::Counter, 0, start, size, constant::WL_COUNTER, &mut wire)
    }

    //read generic area, pass result into a buffer
    fn read(
        &mut self,
        area: Area,
        db_number: i32,
        mut start: i32,
        mut amount: i32,
        mut word_len: i32,
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        // Some adjustment
        match area {
            Area::Counter => word_len = constant::WL_COUNTER,
            Area::Timer => word_len = constant::WL_TIMER,
            _ => {}
        };

        // Calc Word size
        let mut word_size = constant::data_size_byte(word_len);

        if word_size == 0 {
            return Err(Error::Response {
                code: error::ISO_INVALID_DATA_SIZE,
            });
        }

        if word_len == constant::WL_BIT {
            amount = 1; // Only 1 bit can be transferred at time
        } else if word_len != constant::WL_COUNTER && word_len != constant::WL_TIMER {
            amount *= word_size;
            word_size = 1;
            word_len = constant::WL_BYTE;
        }

        let pdu_length = self.transport.pdu_length();

        if pdu_length == 0 {
            return Err(Error::PduLength(pdu_length));
        }

        let max_elements = (pdu_length - 18) / word_size; // 18 = Reply telegram header

        let mut tot_elements = amount;
        let db_bytes = (db_number as u16).to_be_bytes();
        let mut offset = 0;

        while tot_elements > 0 {
            let mut num_elements = tot_elements;

            if num_elements > max_elements {
                num_elements = max_elements;
            }

            let size_requested = num_elements * word_size;
            // Setup the telegram
            let mut request =
                transport::READ_WRITE_TELEGRAM[..constant::SIZE_HEADER_READ as usize].to_vec();

            // Set DB Number
            request[25] = db_bytes[0];
            request[26] = db_bytes[1];

            // Set Area
            request[27] = area as u8;

            // Adjusts Start and word length
            let mut address = match word_len {
                constant::WL_BIT | constant::WL_COUNTER | constant::WL_TIMER => {
                    request[22] = word_len as u8;
                    start
                }
                _ => start << 3,
            };

            // Num elements
            let num_elements_bytes = (num_elements as u16).to_be_bytes();
            request[23] = num_elements_bytes[0];
            request[24] = num_elements_bytes[1];

            // Address into the PLC (only 3 bytes)
            request[30] = (address & 0x0FF) as u8;
            address >>= 8;
            request[29] = (address & 0x0FF) as u8;
            address >>= 8;
            request[28] = (address & 0x0FF) as u8;

            let response = self.transport.send(request.as_slice())?;

            if response.len() < 25 {
                return Err(Error::Response {
                    code: error::ISO_INVALID_DATA_SIZE,
                });
            }

            if response[21] != 0xFF {
                return Err(Error::CPU {
                    code: response[21] as i32,
                });
            }
            let (mut i, end): (usize, usize) = (25, 25 + (size_requested as usize));

            //copy response to buffer
            for k in offset..offset + size_requested {
                if i == end {
                    break;
                }
                buffer[k as usize] = response[i];
                i += 1;
            }
            offset += size_requested;

            tot_elements -= num_elements;
            start += num_elements * word_size
        }
        Ok(())
    }

    fn write(
        &mut self,
        area: Area,
        db_number: i32,
        mut start: i32,
        mut amount: i32,
        mut word_len: i32,
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        // Some adjustment
        word_len = match area {
            Area::Counter => constant::WL_COUNTER,
            Area::Timer => constant::WL_TIMER,
            _ => word_len,
        };

        // Calc Word size
        let mut word_size = constant::data_size_byte(word_len);

        if word_size == 0 {
            return Err(Error::Response {
                code: error::ISO_INVALID_DATA_SIZE,
            });
        }

        if word_len == constant::WL_BIT {
            amount = 1; // Only 1 bit can be transferred at time
        } else if word_len != constant::WL_COUNTER && word_len != constant::WL_TIMER {
            amount *= word_size;
            word_size = 1;
            word_len = constant::WL_BYTE;
        }

        let mut offset: i32 = 0;
        let pdu_length = self.transport.pdu_length();
        let max_elements = (pdu_length - 35) / word_size; // 35 = Reply telegram header
        let mut tot_elements = amount;

        while tot_elements > 0 {
            let mut num_elements = tot_elements;
            if num_elements > max_elements {
                num_elements = max_elements;
            }
            let data_size = num_elements * word_size;
            let iso_size = constant::SIZE_HEADER_WRITE + data_size;

            // Setup the telegram
            let mut request_data = transport::READ_WRITE_TELEGRAM.to_vec();
            // Whole telegram Size
            BigEndian::write_u16(request_data[2..].as_mut(), iso_size as u16);
            // Data length
            let mut length = data_size + 4;
            BigEndian::write_u16(request_data[15..].as_mut(), length as u16);
            // Function
            request_data[17] = 0x05;
            // Set DB Number
            request_data[27] = area as u8;

            if let Area::DataBausteine = area {
                BigEndian::write_u16(request_data[25..].as_mut(), db_number as u16)
            }
            // Adjusts start and word length
            let mut address = match word_len {
                constant::WL_BIT | constant::WL_COUNTER | constant::WL_TIMER => {
                    length = data_size;
                    request_data[22] = word_len as u8;
                    start
                }
                _ => {
                    length = data_size << 3;
                    start << 3
                }
            };

            // Num elements
            BigEndian::write_u16(request_data[23..].as_mut(), num_elements as u16);
            // address into the PLC
            request_data[30] = (address & 0x0FF) as u8;
            address >>= 8;
            request_data[29] = (address & 0x0FF) as u8;
            address >>= 8;
            request_data[28] = (address & 0x0FF) as u8;

            // Transport Size
            match word_len {
                constant::WL_BIT => request_data[32] = constant::TS_RES_BIT as u8,
                constant::WL_COUNTER | constant::WL_TIMER => {
                    request_data[32] = constant::TS_RES_OCTET as u8
                }
                _ => request_data[32] = constant::TS_RES_BYTE as u8, // byte/word/dword etc.
            }
            // length
            BigEndian::write_u16(request_data[33..].as_mut(), length as u16);

            //append values to the telegram
            request_data
                .extend_from_slice(&buffer[offset as usize..offset as usize + data_size as usize]);

            let response = self.transport.send(request_data.as_mut_slice())?;

            if response.len() != 22 {
                return Err(Error::Response {
                    code: error::ISO_INVALID_PDU,
                });
            }

            if response[21] != 0xFF {
                return Err(Error::CPU {
                    code: response[21] as i32,
                });
            }

            offset += data_size;
            tot_elements -= num_elements;
            start += num_elements * word_size;
        }
        Ok(())
    }
}

impl<T: Transport> Client<T> {
    /// Reads up to 20 items in a single telegram.
    pub fn read_multi(&mut self, items: &mut Vec<DataItem>) -> Result<(), Error> {
        let item_len = items.len();
        if item_len > constant::MAX_VARS_MULTI {
            return Err(Error::InvalidInput {
                input: "too many items (>20) in multi read".to_string(),
            });
        }

        let mut request = transport::MULTI_READ_HEADER.to_vec();
        let par_len = (item_len * transport::MULTI_READ_ITEM.len() + 2) as u16;
        BigEndian::write_u16(&mut request[13..15], par_len);
        request[18] = item_len as u8;

        for item in items.iter() {
            let mut s7_item = transport::MULTI_READ_ITEM.to_vec();
            s7_item[3] = item.word_len as u8;
            BigEndian::write_u16(&mut s7_item[4..6], item.amount as u16);
            BigEndian::write_u16(&mut s7_item[6..8], item.db_number as u16);
            s7_item[8] = item.area as u8;

            let mut address = match item.word_len {
                constant::WL_BIT => (item.start << 3) + item.bit_offset,
                constant::WL_COUNTER | constant::WL_TIMER => item.start,
                _ => item.start << 3,
            };
            s7_item[11] = (address & 0xFF) as u8;
            address >>= 8;
            s7_item[10] = (address & 0xFF) as u8;
            address >>= 8;
            s7_item[9] = (address & 0xFF) as u8;

            request.extend_from_slice(&s7_item);
        }

        let total_len = request.len() as u16;
        BigEndian::write_u16(&mut request[2..4], total_len);

        if request.len() as i32 > self.transport.pdu_length() {
            return Err(Error::PduLength(self.transport.pdu_length()));
        }

        let response = self.transport.send(request.as_slice())?;

        if response.len() < 22 {
            return Err(Error::InvalidResponse {
                reason: "PDU too small".to_string(),
                bytes: response,
            });
        }

        let global_result = BigEndian::read_u16(&response[17..19]);
        if global_result != 0 {
            return Err(Error::CPU {
                code: global_result as i32,
            });
        }

        let items_read = response[20] as usize;
        if items_read != item_len {
            return Err(Error::InvalidResponse {
                reason: "returned item count does not match requested count".to_string(),
                bytes: response,
            });
        }

        let mut offset = 21;
        for item in items.iter_mut() {
            let status = response[offset];
            if status == 0xFF {
                let mut item_size = BigEndian::read_u16(&response[offset + 2..offset + 4]);
                let transport_size = response[offset + 1];
                if transport_size != constant::TS_RES_OCTET as u8
                    && transport_size != constant::TS_RES_REAL as u8
                    && transport_size != constant::TS_RES_BIT as u8
                {
                    item_size >>= 3;
                }
                item.buffer = response[offset + 4..offset + 4 + item_size as usize].to_vec();
                item.error = None;

                let mut consumed = item_size;
                if consumed % 2 != 0 {
                    consumed += 1;
                }
                offset += 4 + consumed as usize;
            } else {
                item.error = Some(Error::CPU {
                    code: status as i32,
                });
                offset += 4;
            }
        }
        Ok(())
    }

    /// Writes up to 20 items in a single telegram; per-item failures are
    /// reported in each item's `error` field rather than aborting the batch.
    pub fn write_multi(&mut self, items: &mut Vec<DataItem>) -> Result<(), Error> {
        let item_count = items.len();
        if item_count > constant::MAX_VARS_MULTI {
            return Err(Error::InvalidInput {
                input: "too many items (>20) in multi write".to_string(),
            });
        }

        let mut request = transport::MULTI_WRITE_HEADER.to_vec();
        let par_len = (item_count * transport::MULTI_WRITE_PARAM.len() + 2) as u16;
        BigEndian::write_u16(&mut request[13..15], par_len);
        request[18] = item_count as u8;

        for item in items.iter() {
            let mut param = transport::MULTI_WRITE_PARAM.to_vec();
            param[3] = item.word_len as u8;
            BigEndian::write_u16(&mut param[4..6], item.amount as u16);
            BigEndian::write_u16(&mut param[6..8], item.db_number as u16);
            param[8] = item.area as u8;

            let mut address = match item.word_len {
                constant::WL_BIT => (item.start << 3) + item.bit_offset,
                constant::WL_COUNTER | constant::WL_TIMER => item.start,
                _ => item.start << 3,
            };
            param[11] = (address & 0xFF) as u8;
            address >>= 8;
            param[10] = (address & 0xFF) as u8;
            address >>= 8;
            param[9] = (address & 0xFF) as u8;

            request.extend_from_slice(&param);
        }

        let mut data_length = 0u16;
        for item in items.iter() {
            let transport_size = match item.word_len {
                constant::WL_BIT => constant::TS_RES_BIT as u8,
                constant::WL_COUNTER | constant::WL_TIMER => constant::TS_RES_OCTET as u8,
                _ => constant::TS_RES_BYTE as u8,
            };

            let data_size = item.buffer.len() as u16;
            let length = if transport_size == constant::TS_RES_OCTET as u8
                || transport_size == constant::TS_RES_BIT as u8
            {
                data_size
            } else {
                data_size * 8
            };

            let mut data_item = vec![0u8; 4];
            data_item[1] = transport_size;
            BigEndian::write_u16(&mut data_item[2..4], length);
            data_item.extend_from_slice(&item.buffer);

            if data_item.len() % 2 != 0 {
                data_item.push(0);
            }

            data_length += data_item.len() as u16;
            request.extend_from_slice(&data_item);
        }

        let total_len = request.len() as u16;
        BigEndian::write_u16(&mut request[2..4], total_len);
        BigEndian::write_u16(&mut request[15..17], data_length);

        if request.len() as i32 > self.transport.pdu_length() {
            return Err(Error::PduLength(self.transport.pdu_length()));
        }

        let response = self.transport.send(request.as_slice())?;

        let global_result = BigEndian::read_u16(&response[17..19]);
        if global_result != 0 {
            return Err(Error::CPU {
                code: global_result as i32,
            });
        }

        let items_written = response[20] as usize;
        if items_written != item_count {
            return Err(Error::InvalidResponse {
                reason: "written item count does not match requested count".to_string(),
                bytes: response,
            });
        }

        let mut offset = 21;
        for item in items.iter_mut() {
            let status = response[offset];
            item.error = if status == 0xFF {
                None
            } else {
                Some(Error::CPU {
                    code: status as i32,
                })
            };
            offset += 1;
        }
        Ok(())
    }
}

impl<T: Transport> Client<T> {
    /// Starting the CPU from power off, current configuration is discarded and program processing begins again with the initial values.
    pub fn plc_cold_start(&mut self) -> Result<(), Error> {
        self.cold_warm_start_stop(
            transport::COLD_START_TELEGRAM.as_ref(),
            transport::PDU_START,
            error::CLI_CANNOT_START_PLC,
            transport::PDU_ALREADY_STARTED,
            error::CLI_ALREADY_RUN,
        )
    }

    /// Restarting the CPU without turning the power off, program processing starts once again where retentive data is retained.
    pub fn plc_warm_start(&mut self) -> Result<(), Error> {
        self.cold_warm_start_stop(
            transport::WARM_START_TELEGRAM.as_ref(),
            transport::PDU_START,
            error::CLI_CANNOT_START_PLC,
            transport::PDU_ALREADY_STARTED,
            error::CLI_ALREADY_RUN,
        )
    }

    pub fn plc_stop(&mut self) -> Result<(), Error> {
        self.cold_warm_start_stop(
            transport::STOP_TELEGRAM.as_ref(),
            transport::PDU_STOP,
            error::CLI_CANNOT_STOP_PLC,
            transport::PDU_ALREADY_STOPPED,
            error::CLI_ALREADY_STOP,
        )
    }

    fn cold_warm_start_stop(
        &mut self,
        req: &[u8],
        start_cmp: u8,
        start: i32,
        already_cmp: u8,
        already: i32,
    ) -> Result<(), Error> {
        let response = self.transport.send(req)?;

        if response.len() <= transport::TELEGRAM_MIN_RESPONSE {
            return Err(Error::Response {
                code: error::ISO_INVALID_PDU,
            });
        }
        if response[19] != start_cmp {
            return Err(Error::Response { code: start });
        }
        if response[20] == already_cmp {
            return Err(Error::Response { code: already });
        }
        Ok(())
    }

    pub fn plc_status(&mut self) -> Result<CpuStatus, Error> {
        let response = self
            .transport
            .send(transport::PLC_STATUS_TELEGRAM.as_ref())?;

        if response.len() < transport::PLC_STATUS_MIN_RESPONSE {
            return Err(Error::Response {
                code: error::ISO_INVALID_PDU,
            });
        }

        if BigEndian::read_u16(&response[27..29]) != 0 {
            return Err(Error::Response {
                code: error::ISO_INVALID_PDU,
            });
        }

        Ok(CpuStatus::from_u8(response[44]))
    }

    /// Reads the PLC's current clock.
    pub fn clock_read(&mut self) -> Result<NaiveDateTime, Error> {
        let response = self
            .transport
            .send(transport::GET_DATETIME_TELEGRAM.as_ref())?;

        if response.len() <= 30 {
            return Err(Error::Response {
                code: error::ISO_INVALID_PDU,
            });
        }
        if BigEndian::read_u16(&response[27..29]) != 0 || response[29] != 0xFF {
            return Err(Error::Response {
                code: error::CLI_INVALID_PLC_ANSWER,
            });
        }
        datetime::get_datetime_at(&response, 35)
    }

    /// Sets the PLC's clock.
    pub fn clock_write(&mut self, value: NaiveDateTime) -> Result<(), Error> {
        let mut request = transport::SET_DATETIME_TELEGRAM.to_vec();
        datetime::set_datetime_at(&mut request, 32, value);

        let response = self.transport.send(request.as_slice())?;
        if response.len() <= 30 {
            return Err(Error::Response {
                code: error::ISO_INVALID_PDU,
            });
        }
        if BigEndian::read_u16(&response[27..29]) != 0 {
            return Err(Error::Response {
                code: error::CLI_INVALID_PLC_ANSWER,
            });
        }
        Ok(())
    }

    /// Sets the session password, an 8-byte XOR-folded value.
    pub fn set_session_password(&mut self, password: &str) -> Result<(), Error> {
        let mut pwd = [0x20u8; 8];
        for (i, b) in password.bytes().take(8).enumerate() {
            pwd[i] = b;
        }

        pwd[0] ^= 0x55;
        pwd[1] ^= 0x55;
        for i in 2..8 {
            pwd[i] ^= 0x55 ^ pwd[i - 2];
        }

        let mut request = transport::SET_PWD_TELEGRAM.to_vec();
        request[29..37].copy_from_slice(&pwd);

        let response = self.transport.send(request.as_slice())?;
        self.verify_security_response(&response)
    }

    pub fn clear_session_password(&mut self) -> Result<(), Error> {
        let response = self
            .transport
            .send(transport::CLEAR_PWD_TELEGRAM.as_ref())?;
        self.verify_security_response(&response)
    }

    fn verify_security_response(&self, response: &[u8]) -> Result<(), Error> {
        if response.len() <= 30 {
            return Err(Error::Response {
                code: error::ISO_INVALID_PDU,
            });
        }
        let result = BigEndian::read_u16(&response[27..29]);
        if result != 0 {
            return Err(Error::CPU {
                code: result as i32,
            });
        }
        Ok(())
    }

    pub fn get_protection(&mut self) -> Result<Protection, Error> {
        let szl = self.read_szl(0x0232, 0x0004)?.data;
        Ok(Protection {
            sch_schal: BigEndian::read_u16(&szl[2..4]),
            sch_par: BigEndian::read_u16(&szl[4..6]),
            sch_rel: BigEndian::read_u16(&szl[6..8]),
            bart_sch: BigEndian::read_u16(&szl[8..10]),
            anl_sch: BigEndian::read_u16(&szl[10..12]),
        })
    }

    pub fn get_cp_info(&mut self) -> Result<CpInfo, Error> {
        let szl = self.read_szl(0x0131, 0x0001)?.data;
        Ok(CpInfo {
            max_pdu_length: BigEndian::read_u16(&szl[2..4]),
            max_connections: BigEndian::read_u16(&szl[4..6]),
            max_mpi_rate: BigEndian::read_u16(&szl[6..8]) as u32,
            max_bus_rate: BigEndian::read_u16(&szl[10..12]) as u32,
        })
    }

    pub fn get_cpu_info(&mut self) -> Result<CpuInfo, Error> {
        let szl = self.read_szl(0x001C, 0x0000)?.data;
        if szl.len() < transport::SZL_MIN_RESPONSE {
            return Err(Error::Response {
                code: error::ISO_INVALID_PDU,
            });
        }

        Ok(CpuInfo {
            as_name: trimmed(&szl[2..26])?,
            copyright: trimmed(&szl[104..130])?,
            serial_number: trimmed(&szl[138..162])?,
            module_type_name: trimmed(&szl[172..204])?,
            module_name: trimmed(&szl[36..60])?,
        })
    }

    /// Order code and version, read from the CP-info SZL. The size of the
    /// trailing version triplet is taken from the SZL header's record count
    /// rather than an unset length (the teacher's Go original never sets its
    /// equivalent `size` variable before indexing with it).
    pub fn get_order_code(&mut self) -> Result<OrderCode, Error> {
        let szl = self.read_szl(0x0131, 0x0000)?;
        let data = szl.data;
        if data.len() < 3 {
            return Err(Error::Response {
                code: error::ISO_INVALID_PDU,
            });
        }
        let split = data.len() - 3;
        Ok(OrderCode {
            code: trimmed(&data[..split])?,
            v1: data[split],
            v2: data[split + 1],
            v3: data[split + 2],
        })
    }

    fn read_szl(&mut self, id: u16, index: u16) -> Result<transport::S7SZL, Error> {
        let seq_out: u16 = 0x0000;

        let mut s7_szl_first = transport::SZL_FIRST_TELEGRAM.to_vec();
        BigEndian::write_u16(&mut s7_szl_first[11..13], seq_out + 1);
        BigEndian::write_u16(&mut s7_szl_first[29..31], id);
        BigEndian::write_u16(&mut s7_szl_first[31..33], index);

        let mut res = self.transport.send(s7_szl_first.as_ref())?;

        let validate = |res: &[u8], extra: usize| -> Result<(), Error> {
            if res.len() < transport::MIN_SZL_FIRST_TELEGRAM + extra {
                return Err(Error::Response {
                    code: error::ISO_INVALID_PDU,
                });
            }
            if BigEndian::read_u16(&res[27..29]) != 0 || res[29] != 0xFF {
                return Err(Error::Response {
                    code: error::CLI_INVALID_PLC_ANSWER,
                });
            }
            Ok(())
        };

        validate(&res, 0)?;

        let mut data_szl = BigEndian::read_u16(&res[31..33]) - 8;
        validate(&res, data_szl as usize)?;

        let header = transport::SZLHeader {
            length_header: BigEndian::read_u16(&res[37..39]),
            number_of_data_record: BigEndian::read_u16(&res[39..41]),
        };

        let mut done = res[26] == 0x00;
        let mut seq_in = res[24];

        let mut data = res[41..41 + data_szl as usize].to_vec();

        let mut s7_szl_next = transport::SZL_NEXT_TELEGRAM.to_vec();

        while !done {
            BigEndian::write_u16(&mut s7_szl_next[11..13], seq_out + 1);
            s7_szl_next[24] = seq_in;

            res = self.transport.send(s7_szl_next.as_ref())?;
            validate(&res, 0)?;

            data_szl = BigEndian::read_u16(&res[31..33]);
            if res.len() < 37 + data_szl as usize {
                return Err(Error::Response {
                    code: error::ISO_INVALID_PDU,
                });
            }
            data.extend_from_slice(&res[37..37 + data_szl as usize]);

            done = res[26] == 0x00;
            seq_in = res[24];
        }

        Ok(transport::S7SZL { header, data })
    }

    /// Lists every block of `block_type` present on the PLC.
    fn list_block_type(&mut self, block_type: SubBlockType) -> Result<Vec<i32>, Error> {
        let mut request = transport::PG_BLOCK_LIST_TELEGRAM.to_vec();
        request.push(block_type as u8);

        let response = self.transport.send(request.as_slice())?;
        if response.len() < transport::PG_BLOCK_LIST_MIN_RESPONSE {
            return Err(Error::Response {
                code: error::ISO_INVALID_PDU,
            });
        }

        let payload = &response[33..];
        let mut blocks = Vec::with_capacity(payload.len() / 4);
        for chunk in payload.chunks_exact(4) {
            blocks.push(chunk[0] as i32 * 256 + chunk[1] as i32);
        }
        Ok(blocks)
    }

    pub fn list_blocks(&mut self) -> Result<BlockList, Error> {
        Ok(BlockList {
            ob: self.list_block_type(SubBlockType::OB)?,
            db: self.list_block_type(SubBlockType::DB)?,
            sdb: self.list_block_type(SubBlockType::SDB)?,
            fc: self.list_block_type(SubBlockType::FC)?,
            sfc: self.list_block_type(SubBlockType::SFC)?,
            fb: self.list_block_type(SubBlockType::FB)?,
            sfb: self.list_block_type(SubBlockType::SFB)?,
        })
    }

    pub fn block_info(&mut self, block_type: SubBlockType, mut block_number: u32) -> Result<BlockInfo, Error> {
        let mut request = transport::BLOCK_INFO_TELEGRAM;
        request[30] = block_type as u8;

        request[31] = ((block_number / 10000) + 0x30) as u8;
        block_number %= 10000;
        request[32] = ((block_number / 1000) + 0x30) as u8;
        block_number %= 1000;
        request[33] = ((block_number / 100) + 0x30) as u8;
        block_number %= 100;
        request[34] = ((block_number / 10) + 0x30) as u8;
        block_number %= 10;
        request[35] = (block_number + 0x30) as u8;

        let response = self.transport.send(&request)?;
        if response.len() < transport::BLOCK_INFO_TELEGRAM_MIN_RESPONSE {
            return Err(Error::Response {
                code: error::ISO_INVALID_PDU,
            });
        }

        let result = BigEndian::read_u16(&response[27..29]);
        if result != 0 {
            return Err(Error::CPU {
                code: result as i32,
            });
        }

        Ok(BlockInfo {
            block_flags: response[42],
            block_lang: BlockLang::from_u8(response[43]),
            block_type: SubBlockType::from_u8(response[44]).ok_or(Error::InvalidCpuStatus(response[44]))?,
            block_number: BigEndian::read_u16(&response[45..47]),
            load_size: BigEndian::read_u32(&response[47..51]),
            code_date: datetime::siemens_timestamp(BigEndian::read_u16(&response[59..61])),
            interface_date: datetime::siemens_timestamp(BigEndian::read_u16(&response[65..67])),
            sbb_length: BigEndian::read_u16(&response[67..69]),
            local_data: BigEndian::read_u16(&response[71..73]),
            mc7_size: BigEndian::read_u16(&response[73..75]),
            author: trimmed(&response[75..83])?,
            family: trimmed(&response[83..91])?,
            header: trimmed(&response[91..99])?,
            version: response[99],
            checksum: BigEndian::read_u16(&response[101..103]),
        })
    }

    /// Fills data block `db_number` with `fill_byte`, sized from its block info.
    pub fn db_fill(&mut self, db_number: i32, fill_byte: u8) -> Result<(), Error> {
        let info = self.block_info(SubBlockType::DB, db_number as u32)?;
        let mut buffer = vec![fill_byte; info.mc7_size as usize];
        self.db_write(db_number, 0, info.mc7_size as i32, &mut buffer)
    }

    /// Reads the whole of data block `db_number`, sized from its block info.
    pub fn db_get(&mut self, db_number: i32, buffer: &mut Vec<u8>) -> Result<(), Error> {
        let info = self.block_info(SubBlockType::DB, db_number as u32)?;
        if info.mc7_size as usize > buffer.len() {
            return Err(Error::Response {
                code: error::CLI_BUFFER_TOO_SMALL,
            });
        }
        self.db_read(db_number, 0, info.mc7_size as i32, buffer)
    }

    /// Parses a Siemens mnemonic (e.g. `DB10.DBW4`, `MB0`, `T3`) and reads its value.
    pub fn read_symbolic(&mut self, variable: &str, buffer: &mut Vec<u8>) -> Result<Value, Error> {
        match addr::parse_symbolic(variable)? {
            Symbolic::DbByte { db, start } => {
                self.db_read(db, start, 1, buffer)?;
                Ok(Value::Byte(buffer[0]))
            }
            Symbolic::DbWord { db, start } => {
                self.db_read(db, start, 2, buffer)?;
                Ok(Value::Word(BigEndian::read_u16(&buffer[0..2])))
            }
            Symbolic::DbDWord { db, start } => {
                self.db_read(db, start, 4, buffer)?;
                Ok(Value::DWord(BigEndian::read_u32(&buffer[0..4])))
            }
            Symbolic::DbBit { db, start, bit } => {
                self.db_read(db, start, 1, buffer)?;
                Ok(Value::Bit(buffer[0] & (1 << bit) != 0))
            }
            Symbolic::Merker { start, word_len } => self.read_area_symbolic(Area::Merker, 0, start, word_len, buffer),
            Symbolic::Input { start, word_len } => {
                self.read_area_symbolic(Area::ProcessInput, 0, start, word_len, buffer)
            }
            Symbolic::Output { start, word_len } => {
                self.read_area_symbolic(Area::ProcessOutput, 0, start, word_len, buffer)
            }
            Symbolic::Timer { number } => {
                buffer.resize(2, 0);
                self.tm_read(number, 1, buffer)?;
                Ok(Value::Word(BigEndian::read_u16(&buffer[0..2])))
            }
            Symbolic::Counter { number } => {
                buffer.resize(2, 0);
                self.ct_read(number, 1, buffer)?;
                Ok(Value::Word(BigEndian::read_u16(&buffer[0..2])))
            }
        }
    }

    fn read_area_symbolic(
        &mut self,
        area: Area,
        db_number: i32,
        start: i32,
        word_len: i32,
        buffer: &mut Vec<u8>,
    ) -> Result<Value, Error> {
        match word_len {
            constant::WL_WORD => {
                buffer.resize(2, 0);
                self.read(area, db_number, start, 1, word_len, buffer)?;
                Ok(Value::Word(BigEndian::read_u16(&buffer[0..2])))
            }
            constant::WL_DWORD => {
                buffer.resize(4, 0);
                self.read(area, db_number, start, 1, word_len, buffer)?;
                Ok(Value::DWord(BigEndian::read_u32(&buffer[0..4])))
            }
            _ => {
                buffer.resize(1, 0);
                self.read(area, db_number, start, 1, constant::WL_BYTE, buffer)?;
                Ok(Value::Byte(buffer[0]))
            }
        }
    }
}
