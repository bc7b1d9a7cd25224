//! PDN context definition, activation and deactivation

use nextgsim_common::PdnType;
use tracing::{debug, info, warn};

use super::{PdnSelection, ProcError, ProcResult, UeNas};
use crate::nas::emm::MobilityLayer;
use crate::nas::esm::{SessionLayer, DEFAULT_PDN_CID};
use crate::nas::sap::EsmPrimitive;

impl<M: MobilityLayer, S: SessionLayer> UeNas<M, S> {
    /// Asks the session layer to define PDN context `cid`.
    pub fn define_pdn(
        &mut self,
        cid: u8,
        pdn_type: PdnType,
        apn: Option<&str>,
        is_emergency: bool,
    ) -> ProcResult {
        info!(
            "Defining PDN context: cid={}, type={}, apn={:?}, emergency={}",
            cid, pdn_type, apn, is_emergency
        );
        self.esm.send(EsmPrimitive::PdnConnectivityReq {
            cid,
            is_defined: false,
            pdn_type,
            apn: apn.map(str::to_owned),
            is_emergency,
        })?;
        Ok(())
    }

    /// Asks the session layer to undefine PDN context `cid`.
    pub fn reset_pdn(&mut self, cid: u8) -> ProcResult {
        info!("Undefining PDN context: cid={}", cid);
        self.esm.send(EsmPrimitive::PdnConnectivityRej { cid })?;
        Ok(())
    }

    /// Requests connectivity to the selected PDN contexts.
    ///
    /// A UE that is not attached first initiates attach; a UE attached for
    /// emergency bearer services only cannot activate anything. With
    /// [`PdnSelection::All`] undefined slots are skipped and the sweep stops
    /// at the first failure.
    pub fn activate_pdn(&mut self, selection: PdnSelection) -> ProcResult {
        if !self.emm.is_attached() {
            warn!("UE is not attached to the network, initiating attach first");
            self.initiate_attach().map_err(ProcError::AttachFailed)?;
        } else if self.emm.is_emergency() {
            warn!("UE is attached for emergency bearer services");
            return Err(ProcError::EmergencyAttached);
        }

        match selection {
            PdnSelection::Cid(cid) => self.activate_context(cid, false),
            PdnSelection::All => {
                for cid in 1..=self.esm.max_pdn_contexts() {
                    self.activate_context(cid, true)?;
                }
                Ok(())
            }
        }
    }

    fn activate_context(&mut self, cid: u8, sweep: bool) -> ProcResult {
        let Some(pdn) = self.esm.pdn(cid) else {
            if sweep {
                return Ok(());
            }
            warn!("PDN context {} is not defined", cid);
            return Err(ProcError::UndefinedContext(cid));
        };

        if pdn.is_active {
            warn!("PDN connection {} is already active", cid);
            return Ok(());
        }

        if pdn.is_emergency && self.esm.has_emergency() {
            warn!("PDN connection for emergency bearer services is already established");
            return Err(ProcError::EmergencyAlreadyActive(cid));
        }

        info!("Requesting PDN connectivity: cid={}, type={}", cid, pdn.pdn_type);
        self.esm.send(EsmPrimitive::PdnConnectivityReq {
            cid,
            is_defined: true,
            pdn_type: pdn.pdn_type,
            apn: pdn.apn,
            is_emergency: pdn.is_emergency,
        })?;
        Ok(())
    }

    /// Requests disconnection from the selected PDN contexts.
    ///
    /// The connection established at attach (cid 1) is never released by a
    /// single-context request, and [`PdnSelection::All`] starts from cid 2.
    /// The last active connection is never released.
    pub fn deactivate_pdn(&mut self, selection: PdnSelection) -> ProcResult {
        match selection {
            PdnSelection::Cid(DEFAULT_PDN_CID) => {
                warn!("PDN connection {} was established at attach", DEFAULT_PDN_CID);
                Err(ProcError::DefaultBearerProtected)
            }
            PdnSelection::Cid(cid) => self.deactivate_context(cid),
            PdnSelection::All => {
                for cid in DEFAULT_PDN_CID + 1..=self.esm.max_pdn_contexts() {
                    self.deactivate_context(cid)?;
                }
                Ok(())
            }
        }
    }

    fn deactivate_context(&mut self, cid: u8) -> ProcResult {
        let Some(active) = self.esm.pdn_status(cid) else {
            debug!("PDN context {} is not defined", cid);
            return Ok(());
        };

        if !active {
            warn!("PDN connection {} is not active", cid);
            return Ok(());
        }

        if self.esm.active_pdn_count() <= 1 {
            warn!("Attempt to disconnect from the last PDN connection is not allowed");
            return Err(ProcError::LastConnection(cid));
        }

        info!("Requesting PDN disconnection: cid={}", cid);
        self.esm.send(EsmPrimitive::PdnDisconnectReq { cid })?;
        Ok(())
    }
}
