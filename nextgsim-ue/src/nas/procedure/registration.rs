//! EPS capability, network selection, attach and detach

use tracing::{debug, error, info, warn};

use super::{ProcError, ProcResult, UeNas};
use crate::nas::emm::{AccessTechnology, MobilityLayer, OperatorId, PlmnFormat, PlmnSelectionMode};
use crate::nas::esm::SessionLayer;
use crate::nas::sap::{EmmPrimitive, SapError};

impl<M: MobilityLayer, S: SessionLayer> UeNas<M, S> {
    /// Enables the EPS capability and notifies the mobility layer.
    ///
    /// The capability flag is set even if the layer refuses the primitive.
    pub fn enable_s1_mode(&mut self) -> ProcResult {
        info!("Enabling S1 mode");
        self.eps_capability = true;
        self.emm.send(EmmPrimitive::S1Enabled)?;
        Ok(())
    }

    /// Disables the EPS capability and notifies the mobility layer.
    pub fn disable_s1_mode(&mut self) -> ProcResult {
        info!("Disabling S1 mode");
        self.eps_capability = false;
        self.emm.send(EmmPrimitive::S1Disabled)?;
        Ok(())
    }

    /// Runs network selection and asks the mobility layer to register to the
    /// selected PLMN.
    pub fn register(
        &mut self,
        mode: PlmnSelectionMode,
        format: PlmnFormat,
        operator: Option<&OperatorId>,
        act: Option<AccessTechnology>,
    ) -> ProcResult {
        debug!(
            "Network selection: mode={:?}, format={:?}, operator={:?}, act={:?}",
            mode, format, operator, act
        );

        let Some(index) = self.emm.select_plmn(mode, format, operator, act) else {
            error!("Failed to select PLMN");
            return Err(ProcError::PlmnSelection);
        };

        info!("Registering to PLMN at index {}", index);
        self.emm.send(EmmPrimitive::RegisterReq { index })?;
        Ok(())
    }

    /// Deregistration from the network is not supported; the request is
    /// logged and accepted.
    pub fn deregister(&mut self) -> ProcResult {
        error!("Network deregistration is not implemented");
        Ok(())
    }

    /// Initiates the attach procedure for normal services unless already
    /// attached.
    pub fn attach(&mut self) -> ProcResult {
        if self.emm.is_attached() {
            debug!("UE is already attached");
            return Ok(());
        }
        self.initiate_attach()?;
        Ok(())
    }

    pub(super) fn initiate_attach(&mut self) -> Result<(), SapError> {
        info!("Initiating attach procedure");
        self.emm.send(EmmPrimitive::AttachInit { is_emergency: false })
    }

    /// Initiates the detach procedure unless already detached.
    pub fn detach(&mut self, switch_off: bool) -> ProcResult {
        if !self.emm.is_attached() {
            debug!("UE is not attached");
            return Ok(());
        }
        info!("Initiating detach procedure: switch_off={}", switch_off);
        self.emm
            .send(EmmPrimitive::DetachInit { switch_off })
            .map_err(|e| {
                warn!("Detach request refused: {}", e);
                ProcError::Sap(e)
            })
    }
}
