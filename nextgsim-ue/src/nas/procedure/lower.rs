//! Events reported by the access stratum

use std::borrow::Cow;

use nextgsim_common::log_nas_message;
use tracing::{debug, info, warn};

use super::{ProcError, ProcResult, UeNas};
use crate::nas::emm::{AccessTechnology, MobilityLayer};
use crate::nas::esm::SessionLayer;
use crate::nas::sap::EmmPrimitive;

/// Cell information reported by the access stratum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellInfo {
    /// Whether a suitable cell was found
    pub found: bool,
    /// Tracking area code
    pub tac: u16,
    /// E-UTRAN cell identity
    pub cell_id: u32,
    /// Radio access technology
    pub rat: AccessTechnology,
    /// Reference signal received quality
    pub rsrq: u8,
    /// Reference signal received power
    pub rsrp: u8,
}

impl<M: MobilityLayer, S: SessionLayer> UeNas<M, S> {
    /// Stores the signal measurements and forwards the cell information to
    /// the mobility layer.
    pub fn cell_info(&mut self, cell: CellInfo) -> ProcResult {
        debug!(
            "Cell info: found={}, tac={:04x}, ci={:08x}, rat={}, rsrq={}, rsrp={}",
            cell.found, cell.tac, cell.cell_id, cell.rat, cell.rsrq, cell.rsrp
        );

        self.rsrq = cell.rsrq;
        self.rsrp = cell.rsrp;

        self.emm.send(EmmPrimitive::CellInfoRes {
            found: cell.found,
            tac: cell.tac,
            cell_id: cell.cell_id,
            rat: cell.rat,
        })?;
        Ok(())
    }

    /// NAS signalling connection established; `nas_msg` is the initial
    /// downlink message.
    pub fn establish_cnf(&mut self, nas_msg: &[u8]) -> ProcResult {
        info!("NAS signalling connection established");
        log_nas_message("EstablishCnf", nas_msg);
        self.emm.send(EmmPrimitive::EstablishCnf {
            nas_msg: Cow::Borrowed(nas_msg),
        })?;
        Ok(())
    }

    /// NAS signalling connection establishment failed.
    pub fn establish_rej(&mut self) -> ProcResult {
        warn!("NAS signalling connection establishment rejected");
        self.emm.send(EmmPrimitive::EstablishRej)?;
        Ok(())
    }

    /// NAS signalling connection released by the network.
    pub fn release_ind(&mut self, cause: u8) -> ProcResult {
        info!("NAS signalling connection released: cause={}", cause);
        self.emm.send(EmmPrimitive::ReleaseInd { cause })?;
        Ok(())
    }

    /// Uplink NAS message delivered to the network.
    pub fn ul_transfer_cnf(&mut self) -> ProcResult {
        debug!("Uplink NAS message delivered");
        self.send_data_ind(true, &[])
    }

    /// Uplink NAS message not delivered to the network.
    pub fn ul_transfer_rej(&mut self) -> ProcResult {
        warn!("Uplink NAS message not delivered");
        self.send_data_ind(false, &[])
    }

    /// Downlink NAS message received; empty messages are refused.
    pub fn dl_transfer_ind(&mut self, nas_msg: &[u8]) -> ProcResult {
        if nas_msg.is_empty() {
            warn!("Downlink transfer indication without NAS message");
            return Err(ProcError::EmptyDownlink);
        }
        log_nas_message("DlInformationTransfer", nas_msg);
        self.send_data_ind(true, nas_msg)
    }

    fn send_data_ind(&mut self, delivered: bool, nas_msg: &[u8]) -> ProcResult {
        self.emm.send(EmmPrimitive::DataInd {
            ue_id: self.ue_id,
            delivered,
            nas_msg: Cow::Borrowed(nas_msg),
        })?;
        Ok(())
    }
}
